//! 命令行参数与运行前确认

use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Extract entity descriptions from a book and write one scene prompt per chapter
#[derive(Parser, Debug)]
#[command(name = "bookscene", version, about)]
pub struct Cli {
    /// Explicit configuration file (defaults to bookscene.toml / bookscene.local.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run offline: no requests are sent and canned results are used
    #[arg(long, default_value_t = false)]
    pub local: bool,

    /// Skip the confirmation prompt
    #[arg(short, long, default_value_t = false)]
    pub yes: bool,

    /// Output folder, overrides output.folder
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input files; when given they replace the input folder listing
    pub files: Vec<PathBuf>,
}

/// `yes` 或空行表示继续
pub fn is_confirmed(answer: &str) -> bool {
    let answer = answer.trim();
    answer.is_empty() || answer.eq_ignore_ascii_case("yes")
}

/// 列出待处理文件并等待确认
pub fn confirm(files: &[PathBuf]) -> std::io::Result<bool> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "The following files will be processed:")?;
    for file in files {
        writeln!(out, "  {}", file.display())?;
    }
    write!(out, "Do you want to continue? (yes/no) ")?;
    out.flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_confirmed(&answer))
}
