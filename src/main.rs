use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use daisyforge::{ChapterNaming, Extractor, OutputFormat, Result, RunSummary, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 🎧 daisyforge - DAISY 2.02有声书转换工具
#[derive(Parser)]
#[command(name = "daisyforge")]
#[command(about = "把DAISY 2.02有声书转换为按章节重命名的音频文件和REAPER标记")]
#[command(version)]
struct Args {
    /// 输入目录
    #[arg(short, long, required_unless_present = "print_default_config", help = "包含NCC.HTML的DAISY目录")]
    input_directory: Option<PathBuf>,

    /// 输出目录
    #[arg(short, long, required_unless_present = "print_default_config", help = "输出目录，每本书一个子目录")]
    output_directory: Option<PathBuf>,

    /// 配置文件
    #[arg(short, long, help = "YAML配置文件路径")]
    config: Option<PathBuf>,

    /// 输出产物
    #[arg(short, long, value_enum, help = "输出标记表、工程文件或两者")]
    format: Option<OutputFormat>,

    /// 章标签策略
    #[arg(long, value_enum, help = "章序号的生成方式")]
    chapter_naming: Option<ChapterNaming>,

    /// 失败后继续
    #[arg(short, long, help = "某本书失败后继续处理其余的书")]
    keep_going: bool,

    /// 详细输出模式
    #[arg(short, long, help = "显示调试日志")]
    verbose: bool,

    /// 只规划不写入
    #[arg(long, help = "只显示将要执行的操作，不写入任何文件")]
    dry_run: bool,

    /// 打印默认配置
    #[arg(long, help = "打印默认配置文件内容后退出")]
    print_default_config: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.print_default_config {
        return match Settings::default_yaml() {
            Ok(yaml) => {
                print!("{}", yaml);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ 错误: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    println!("🎧 daisyforge - DAISY有声书转换工具");

    match run(&args) {
        Ok(summary) => {
            print_summary(&summary);
            if summary.is_success() {
                println!("🎉 处理完成！");
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            eprintln!("❌ 错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "daisyforge=debug" } else { "daisyforge=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// 合并配置文件和命令行参数，命令行优先
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };

    if let Some(format) = args.format {
        settings.output_format = format;
    }
    if let Some(chapter_naming) = args.chapter_naming {
        settings.chapter_naming = chapter_naming;
    }
    if args.keep_going {
        settings.keep_going = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn run(args: &Args) -> Result<RunSummary> {
    let settings = load_settings(args)?;
    let input = args.input_directory.clone().unwrap_or_default();
    let output = args.output_directory.clone().unwrap_or_default();

    println!("📂 输入目录: {}", input.display());
    println!("📁 输出目录: {}", output.display());
    if args.dry_run {
        println!("🔍 试运行模式：不会写入任何文件");
    }

    Extractor::new(settings)
        .with_dry_run(args.dry_run)
        .run(&input, &output)
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 处理结果:");
    println!("  找到NCC: {} 个", summary.navigation_files);

    for book in &summary.processed {
        println!(
            "  ✅ {:02}. {} ({} 个音频文件, {} 个标记)",
            book.index, book.title, book.audio_files, book.segments
        );
        for output in &book.outputs {
            println!("       📝 {}", output.display());
        }
    }

    if !summary.failed.is_empty() {
        eprintln!("\n⚠️  {} 本书处理失败:", summary.failed.len());
        for failed in &summary.failed {
            eprintln!("  ❌ {}: {}", failed.name, failed.error);
        }
    }
}
