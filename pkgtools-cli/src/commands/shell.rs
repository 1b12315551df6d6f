//! `split` and `join`: shell word splitting and quoting.

use std::io::Write;

use clap::Args;
use pkgtools::shell;

use super::emit;
use crate::error::CliError;

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Command line to split into words
    pub line: String,
}

#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Words to quote and join
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

/// Print each word of the line on its own line.
pub fn run_split(args: &SplitArgs, out: &mut dyn Write) -> Result<(), CliError> {
    for word in shell::tokenize(&args.line)? {
        emit(out, word)?;
    }
    Ok(())
}

/// Print the words as a single shell command line.
pub fn run_join(args: &JoinArgs, out: &mut dyn Write) -> Result<(), CliError> {
    emit(out, shell::join(&args.words))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::output_of;

    #[test]
    fn test_split() {
        let args = SplitArgs {
            line: r#"make -DBATCH "CFLAGS=-O2 -pipe" it\'s"#.to_string(),
        };
        let out = output_of(|out| run_split(&args, out));
        assert_eq!(out, "make\n-DBATCH\nCFLAGS=-O2 -pipe\nit's\n");
    }

    #[test]
    fn test_split_unterminated_quote() {
        let args = SplitArgs {
            line: "echo 'oops".to_string(),
        };
        let err = run_split(&args, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::Pkg(_)));
    }

    #[test]
    fn test_join_roundtrips_through_split() {
        let args = JoinArgs {
            words: vec!["echo".into(), "a b".into(), "".into(), "$HOME".into()],
        };
        let line = output_of(|out| run_join(&args, out));

        let split = SplitArgs {
            line: line.trim_end_matches('\n').to_string(),
        };
        let words = output_of(|out| run_split(&split, out));
        assert_eq!(words, "echo\na b\n\n$HOME\n");
    }
}
