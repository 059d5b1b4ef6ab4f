//! Stylesheet compiler capability for the swatch theme pipeline.
//!
//! The pipeline treats the LESS compiler as an opaque oracle: it hands over
//! source text and reads back CSS. [`StyleCompiler`] is that seam. The
//! production implementation, [`LesscCompiler`], shells out to `lessc`;
//! tests substitute a scripted fake.
//!
//! ```rust,no_run
//! use swatch_compile::{CompileOptions, LesscCompiler, StyleCompiler};
//!
//! # async fn demo() -> Result<(), swatch_compile::CompileError> {
//! let compiler = LesscCompiler::new();
//! let options = CompileOptions::new().with_search_paths(["node_modules/antd/lib/style"]);
//! let css = compiler.compile("@c: #1890ff; .a { color: @c; }", &options).await?;
//! # let _ = css;
//! # Ok(())
//! # }
//! ```

mod compiler;
mod error;
mod lessc;
mod process;

pub use compiler::{CompileOptions, StyleCompiler};
pub use error::CompileError;
pub use lessc::LesscCompiler;
pub use process::{run_command, ProcessError};
