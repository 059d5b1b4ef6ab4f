use std::time::Duration;

use async_trait::async_trait;

use crate::compiler::{CompileOptions, StyleCompiler};
use crate::error::CompileError;
use crate::process::{run_command, ProcessError};

/// [`StyleCompiler`] backed by the `lessc` command-line compiler.
///
/// Source is piped on stdin (`lessc -`) and the CSS read back from stdout.
/// Each call runs on a blocking thread so many files can compile at once.
#[derive(Debug, Clone)]
pub struct LesscCompiler {
    program: String,
    timeout: Option<Duration>,
    npm_import: bool,
}

impl Default for LesscCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl LesscCompiler {
    pub fn new() -> Self {
        Self {
            program: "lessc".to_string(),
            timeout: None,
            npm_import: true,
        }
    }

    /// Use a different `lessc` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Kill compilations that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enable or disable the `less-plugin-npm-import` plugin used for `~` imports.
    pub fn with_npm_import(mut self, enabled: bool) -> Self {
        self.npm_import = enabled;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for one compilation.
    pub fn args(&self, options: &CompileOptions) -> Vec<String> {
        let mut args = Vec::new();
        if options.javascript_enabled {
            args.push("--js".to_string());
        }

        let paths = options.effective_search_paths();
        if !paths.is_empty() {
            if let Ok(joined) = std::env::join_paths(&paths) {
                args.push(format!("--include-path={}", joined.to_string_lossy()));
            }
        }

        if self.npm_import {
            if let Some(prefix) = &options.module_prefix {
                args.push(format!("--npm-import=prefix={}", prefix));
            }
        }

        args.push("-".to_string());
        args
    }
}

#[async_trait]
impl StyleCompiler for LesscCompiler {
    async fn compile(
        &self,
        source: &str,
        options: &CompileOptions,
    ) -> Result<String, CompileError> {
        let program = self.program.clone();
        let args = self.args(options);
        let source = source.to_string();
        let timeout = self.timeout;

        tracing::debug!(program = %program, ?args, "running less compiler");
        let result =
            tokio::task::spawn_blocking(move || run_command(&program, &args, &source, timeout))
                .await?;

        match result {
            Ok(css) => Ok(css),
            Err(ProcessError::CommandFailed { stderr, .. }) if !stderr.is_empty() => {
                Err(CompileError::rejected(stderr))
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default() {
        let compiler = LesscCompiler::new();
        let args = compiler.args(&CompileOptions::new());
        assert_eq!(
            args,
            vec![
                "--js".to_string(),
                "--npm-import=prefix=~".to_string(),
                "-".to_string(),
            ]
        );
    }

    #[test]
    fn test_args_include_paths_and_no_plugin() {
        let compiler = LesscCompiler::new().with_npm_import(false);
        let mut options = CompileOptions::new().with_search_paths(["lib/style"]);
        options.javascript_enabled = false;
        let args = compiler.args(&options);
        assert_eq!(
            args,
            vec!["--include-path=lib/style".to_string(), "-".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_process_error() {
        let compiler = LesscCompiler::new().with_program("swatch-no-such-lessc");
        let err = compiler
            .compile(".a { color: red; }", &CompileOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CompileError::Process(ProcessError::Io(_))));
    }
}
