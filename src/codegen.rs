//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

pub mod arguments;
pub mod config;
pub mod context;
pub mod kernel;
pub mod stream;

pub use arguments::{ArgBinding, KernelArguments, KernelParam};
pub use config::{Dialect, GeneratorConfig};
pub use context::KernelContext;
pub use kernel::assemble_kernel;
pub use stream::KernelBody;
