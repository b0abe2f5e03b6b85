//------------------------------------------------------------------------------
//
// Copyright 2025 Jiri Bobek. All rights reserved.
// License: GPL 3.0 or later. See LICENSE.txt for details.
//
//------------------------------------------------------------------------------

use std::fmt::Write;

//--------------------------------------------------------------------------------------------------

/// Append-only text of one kernel body. Every line is indented by the current tab count.
#[derive(Debug, Clone, Default)]
pub struct KernelBody {
	text: String,
	tab_count: usize,
}

impl KernelBody {
	pub fn new() -> Self {
		Self { text: String::new(), tab_count: 0 }
	}

	pub fn inc_tab(&mut self) {
		self.tab_count += 1;
	}

	pub fn dec_tab(&mut self) {
		debug_assert!(self.tab_count > 0, "KernelBody::dec_tab(): unbalanced indentation");
		self.tab_count = self.tab_count.saturating_sub(1);
	}

	pub fn tab_count(&self) -> usize {
		self.tab_count
	}

	pub fn line(&mut self, line: &str) {
		self.line_fmt(format_args!("{line}"));
	}

	pub fn line_fmt(&mut self, args: std::fmt::Arguments) {
		for _ in 0..self.tab_count {
			self.text.push('\t');
		}
		// writing into a String cannot fail
		let _ = self.text.write_fmt(args);
		self.text.push('\n');
	}

	pub fn as_str(&self) -> &str {
		&self.text
	}

	pub fn into_string(self) -> String {
		self.text
	}

	/// Number of lines in the body that are exactly `line`, ignoring indentation.
	pub fn count_lines(&self, line: &str) -> usize {
		self.text.lines().filter(|l| l.trim_start_matches('\t') == line).count()
	}
}

impl std::fmt::Display for KernelBody {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		f.write_str(&self.text)
	}
}

//--------------------------------------------------------------------------------------------------


//--------------------------------------------------------------------------------------------------
