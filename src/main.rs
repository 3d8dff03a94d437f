//! 程序入口：初始化日志、解析命令行，并把用户意图交给 VM 桥接层

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::fmt::SubscriberBuilder;

use confmap::model::performance::run_performance_suite;
use confmap::model::render::{DisplayMode, Layout};
use confmap::utils::fs::write_json_file;
use confmap::vm::bridge::{BridgeReply, Intent, ViewModelBridge, STATUS_READY};
use confmap::{AppState, Config, ExportStyle, NodeRef};

#[derive(Parser)]
#[command(name = "confmap")]
#[command(about = "把 YAML/JSON 配置文件变成可浏览的导图树", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 配置文件（YAML 或 JSON）
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// 显示初始视图
    Show { file: PathBuf },
    /// 搜索并显示展开后的视图
    Search { file: PathBuf, query: String },
    /// 导出节点谱系（节点写作 #id 或 深度:标签）
    Lineage {
        file: PathBuf,
        node: String,
        /// 使用冒号嵌套格式
        #[arg(long)]
        nested: bool,
        /// 同时复制到系统剪贴板
        #[arg(long)]
        copy: bool,
    },
    /// 输出渲染载荷 JSON
    Render {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        layout: Option<Layout>,
        #[arg(long)]
        display: Option<DisplayMode>,
    },
    /// 交互式会话
    Repl { file: PathBuf },
    /// 运行性能基准
    Bench,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志输出；写到 stderr，stdout 只留给结果
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let _ = SubscriberBuilder::default()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();

    let config = match &cli.config {
        Some(p) => Config::from_path(p).with_context(|| format!("无法加载配置 {}", p.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Show { file } => {
            let mut bridge = open(&file, config, false)?;
            print_reply(&bridge.dispatch(Intent::Show))
        }
        Commands::Search { file, query } => {
            let mut bridge = open(&file, config, false)?;
            print_reply(&bridge.dispatch(Intent::Search(query)))
        }
        Commands::Lineage { file, node, nested, copy } => {
            let node: NodeRef = node.parse()?;
            let style = if nested { ExportStyle::Nested } else { ExportStyle::Outline };
            let mut bridge = open(&file, config, copy)?;
            print_reply(&bridge.dispatch(Intent::CopyLineage(node, style)))
        }
        Commands::Render { file, output, layout, display } => {
            let mut bridge = open(&file, config, false)?;
            if let Some(layout) = layout {
                bridge.dispatch(Intent::SetLayout(layout));
            }
            if let Some(display) = display {
                bridge.dispatch(Intent::SetDisplay(display));
            }
            match output {
                Some(out) => {
                    let payload = bridge.app_state().render_payload()?;
                    write_json_file(&out, &payload).with_context(|| format!("无法写入 {}", out.display()))?;
                    tracing::info!("渲染载荷已保存到: {}", out.display());
                    Ok(())
                }
                None => print_reply(&bridge.dispatch(Intent::RenderJson)),
            }
        }
        Commands::Repl { file } => {
            let bridge = open(&file, config, true)?;
            repl(bridge)
        }
        Commands::Bench => {
            for r in run_performance_suite(&config.build) {
                let mark = if r.success { "ok" } else { "FAIL" };
                println!("{:<4} {:<28} {:>6}ms  {}", mark, r.operation, r.duration_ms, r.details);
            }
            Ok(())
        }
    }
}

fn open(file: &Path, config: Config, clipboard: bool) -> Result<ViewModelBridge> {
    let mut state = AppState::with_config(config);
    let count = state
        .load_file(file)
        .with_context(|| format!("无法加载 {}", file.display()))?;
    tracing::info!("文件加载成功: {} 个节点", count);
    Ok(ViewModelBridge::new(state, clipboard))
}

/// 一次性命令：状态写到 stderr，正文写到 stdout，错误作为失败退出
fn print_reply(reply: &BridgeReply) -> Result<()> {
    if reply.is_error() {
        bail!("{}", reply.status);
    }
    eprintln!("{}", reply.status);
    if let Some(body) = &reply.body {
        print!("{}", body);
    }
    Ok(())
}

fn repl(mut bridge: ViewModelBridge) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let first = bridge.dispatch(Intent::Show);
    writeln!(stdout, "{}\n{}", STATUS_READY, first.body.unwrap_or_default())?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if matches!(line, "quit" | "exit" | "q") {
            break;
        }
        let reply = match line.parse::<Intent>() {
            Ok(intent) => bridge.dispatch(intent),
            Err(e) => {
                writeln!(stdout, "{}", e)?;
                continue;
            }
        };
        writeln!(stdout, "{}", reply.status)?;
        if let Some(body) = reply.body {
            write!(stdout, "{}", body)?;
            if !body.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
