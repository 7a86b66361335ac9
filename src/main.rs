use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, info};

use testpalm_filter::{FilterCompiler, FilterError, ProjectDefinitions, Syntax};

#[derive(Debug, Parser)]
#[command(
    name = "tpfilter",
    about = "Compile test-case filters into backend filter expressions"
)]
struct Cli {
    /// 项目属性定义的JSON文件
    #[arg(short, long)]
    definitions: Option<PathBuf>,

    /// 属性定义所属的项目
    #[arg(short, long, default_value = "default")]
    project: String,

    /// 使用 `title=value&title=v1,v2` 语法
    #[arg(long)]
    simple: bool,

    /// 输出带缩进的JSON
    #[arg(long)]
    pretty: bool,

    /// 要编译的过滤器，省略时进入交互模式
    filter: Option<String>,
}

impl Cli {
    fn syntax(&self) -> Syntax {
        if self.simple {
            Syntax::Simple
        } else {
            Syntax::Expression
        }
    }
}

fn main() {
    // 日志输出到 stderr，级别由 RUST_LOG 控制
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli, &mut io::stdout()) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    let compiler = FilterCompiler::new(load_definitions(cli)?);

    match &cli.filter {
        Some(filter) => {
            let output = run_once(&compiler, cli, filter)?;
            writeln!(out, "{}", output)?;
            Ok(())
        }
        None => repl(&compiler, cli),
    }
}

/// 加载属性定义，未指定文件时使用空项目
fn load_definitions(cli: &Cli) -> Result<ProjectDefinitions> {
    let definitions = match &cli.definitions {
        Some(path) => ProjectDefinitions::from_json_file(&cli.project, path)
            .with_context(|| format!("loading definitions for project `{}`", cli.project))?,
        None => {
            info!("no definitions file given, only status and isAutotest can be used");
            ProjectDefinitions::empty(&cli.project)
        }
    };
    debug!(project = %cli.project, count = definitions.len(), "project definitions ready");
    Ok(definitions)
}

fn run_once(
    compiler: &FilterCompiler<ProjectDefinitions>,
    cli: &Cli,
    filter: &str,
) -> Result<String> {
    compiler
        .render(filter, cli.syntax(), cli.pretty)
        .with_context(|| format!("compiling filter `{}`", filter))
}

/// 逐行编译过滤器，单行失败只打印错误并继续
fn run_session<I, O, E>(
    compiler: &FilterCompiler<ProjectDefinitions>,
    cli: &Cli,
    lines: I,
    out: &mut O,
    err: &mut E,
) -> Result<()>
where
    I: IntoIterator<Item = Result<String, ReadlineError>>,
    O: Write,
    E: Write,
{
    for line in lines {
        let line = match line {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading filter"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match run_once(compiler, cli, line) {
            Ok(output) => writeln!(out, "{}", output)?,
            Err(e) => {
                writeln!(err, "✗ {:#}", e)?;
                if let Some(span) = e.downcast_ref::<FilterError>().and_then(FilterError::span) {
                    writeln!(err, "  at {}", span)?;
                }
            }
        }
    }

    Ok(())
}

fn banner(definitions: &ProjectDefinitions) -> String {
    let mut banner = format!("--- tpfilter: project `{}` ---\n", definitions.project());
    if !definitions.is_empty() {
        let titles: Vec<&str> = definitions
            .definitions()
            .iter()
            .map(|definition| definition.title.as_str())
            .collect();
        banner.push_str(&format!("Attributes: {}\n", titles.join(", ")));
    }
    banner.push_str("Enter a filter per line, Ctrl-D to exit.");
    banner
}

fn repl(compiler: &FilterCompiler<ProjectDefinitions>, cli: &Cli) -> Result<()> {
    let mut editor = DefaultEditor::new().context("starting line editor")?;
    println!("{}", banner(compiler.resolver()));

    let lines = std::iter::from_fn(|| {
        let line = editor.readline("filter> ");
        if let Ok(text) = &line {
            let text = text.trim();
            if !text.is_empty() {
                if let Err(err) = editor.add_history_entry(text) {
                    debug!(error = %err, "failed to add history entry");
                }
            }
        }
        Some(line)
    });

    run_session(compiler, cli, lines, &mut io::stdout(), &mut io::stderr())
}
