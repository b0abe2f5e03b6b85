//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use crate::codegen::arguments::KernelArguments;
use crate::codegen::stream::KernelBody;

//--------------------------------------------------------------------------------------------------

/// Wraps a finished body into a kernel definition using the parameters declared in `args`.
pub fn assemble_kernel(name: &str, args: &KernelArguments, body: &KernelBody) -> String {
	let qualifier = args.dialect().kernel_qualifier();
	let signature = args.signature();
	let mut source = String::with_capacity(body.as_str().len() + signature.len() + 64);
	source.push_str(qualifier);
	source.push(' ');
	source.push_str(name);
	source.push('(');
	source.push_str(signature);
	source.push_str(")\n{\n");
	for line in body.as_str().lines() {
		source.push('\t');
		source.push_str(line);
		source.push('\n');
	}
	source.push_str("}\n");
	source
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
