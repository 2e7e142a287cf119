use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cp_common::{DashboardConfig, FetchResponse, SubmissionRecord};
use dashboard_wasm::{Dashboard, DashboardCharts, FetchOutcome, ListView, YearView};
use submission_filter::{FilterCriteria, FilterOptions, SortDirection, SortField, SortSpec};
use submission_stats::GeometrySnapshot;

/// 输出报告
#[derive(Serialize)]
struct Report {
    handle: String,
    outcome: FetchOutcome,
    filter_options: FilterOptions,
    list: ListView,
    years: YearView,
    charts: DashboardCharts,
}

// 主函数
fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("错误: {:#}", e);
            std::process::exit(1);
        }
    }
}

// 设置命令行参数
fn build_cli() -> Command {
    Command::new("刷题统计报告")
        .version(env!("CARGO_PKG_VERSION"))
        .about("从提交记录生成筛选列表与图表数据")
        .arg(Arg::new("input")
            .short('i')
            .long("input")
            .value_name("FILE")
            .help("提交记录JSON文件（数据源响应或记录数组）")
            .required(true))
        .arg(Arg::new("handle")
            .short('u')
            .long("handle")
            .value_name("HANDLE")
            .help("用户名，默认使用输入文件名"))
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("配置JSON文件"))
        .arg(Arg::new("min_rating")
            .long("min-rating")
            .value_name("RATING")
            .value_parser(clap::value_parser!(i32))
            .help("最低难度"))
        .arg(Arg::new("max_rating")
            .long("max-rating")
            .value_name("RATING")
            .value_parser(clap::value_parser!(i32))
            .help("最高难度"))
        .arg(Arg::new("tag")
            .short('t')
            .long("tag")
            .value_name("TAG")
            .action(ArgAction::Append)
            .help("标签筛选，可重复，命中任意一个即可"))
        .arg(Arg::new("language")
            .short('l')
            .long("language")
            .value_name("LANGUAGE")
            .help("语言筛选"))
        .arg(Arg::new("sort_by")
            .short('s')
            .long("sort-by")
            .value_name("FIELD")
            .value_parser(["creation_time_seconds", "problem_rating", "problem_name", "problem_id", "language"])
            .default_value("creation_time_seconds")
            .help("排序字段"))
        .arg(Arg::new("order")
            .short('o')
            .long("order")
            .value_parser(["asc", "desc"])
            .default_value("desc")
            .help("排序方向"))
        .arg(Arg::new("page")
            .short('p')
            .long("page")
            .value_parser(clap::value_parser!(usize))
            .default_value("1")
            .help("页码"))
        .arg(Arg::new("year")
            .short('y')
            .long("year")
            .value_parser(clap::value_parser!(i32))
            .help("周统计所用的年份，默认最近一年"))
        .arg(Arg::new("pretty")
            .long("pretty")
            .help("格式化输出JSON")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .help("显示详细信息")
            .action(ArgAction::SetTrue))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// 读取数据源响应，兼容裸记录数组
fn load_records(path: &Path) -> anyhow::Result<Vec<SubmissionRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("无法读取文件 {}", path.display()))?;

    if text.trim_start().starts_with('[') {
        return serde_json::from_str(&text)
            .with_context(|| format!("解析提交记录失败: {}", path.display()));
    }

    let response = FetchResponse::from_json(&text)
        .with_context(|| format!("解析数据源响应失败: {}", path.display()))?;
    Ok(response.into_result()?)
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<DashboardConfig> {
    match matches.get_one::<String>("config") {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("无法读取配置 {}", path))?;
            Ok(DashboardConfig::from_json(&text)?)
        }
        None => Ok(DashboardConfig::default()),
    }
}

fn criteria_from(matches: &ArgMatches) -> FilterCriteria {
    FilterCriteria {
        min_rating: matches.get_one::<i32>("min_rating").copied(),
        max_rating: matches.get_one::<i32>("max_rating").copied(),
        tags: matches
            .get_many::<String>("tag")
            .map(|tags| tags.map(|t| t.trim().to_string()).collect())
            .unwrap_or_default(),
        language: matches.get_one::<String>("language").cloned(),
    }
}

fn sort_from(matches: &ArgMatches) -> anyhow::Result<SortSpec> {
    let field: SortField = matches
        .get_one::<String>("sort_by")
        .map(String::as_str)
        .unwrap_or("creation_time_seconds")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let direction: SortDirection = matches
        .get_one::<String>("order")
        .map(String::as_str)
        .unwrap_or("desc")
        .parse()
        .map_err(anyhow::Error::msg)?;
    Ok(SortSpec::new(field, direction))
}

// 生成报告
fn run(matches: &ArgMatches) -> anyhow::Result<String> {
    let input = Path::new(
        matches
            .get_one::<String>("input")
            .context("缺少输入文件")?,
    );
    let handle = match matches.get_one::<String>("handle") {
        Some(handle) => handle.clone(),
        None => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    let mut dashboard = Dashboard::new(load_config(matches)?)?;

    // 没有渲染中的年份控件，几何信息为空
    let mut scroller = GeometrySnapshot::default();

    let ticket = dashboard.begin_fetch(&handle)?;
    let records = load_records(input).map_err(|e| cp_common::CommonError::DataSource(format!("{:#}", e)));
    let outcome = dashboard.complete_fetch(ticket, records, &mut scroller);
    if let FetchOutcome::Failed { message } = &outcome {
        bail!("{}", message);
    }
    info!(handle = %handle, records = dashboard.records().len(), "记录已载入");

    dashboard.apply(criteria_from(matches), sort_from(matches)?);

    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);
    if page != 1 {
        dashboard.go_to_page(page)?;
    }

    if let Some(&year) = matches.get_one::<i32>("year") {
        dashboard.select_year(year, &mut scroller)?;
    }
    debug!(page, total_pages = dashboard.total_pages(), "生成报告");

    let report = Report {
        handle,
        outcome,
        filter_options: dashboard.filter_options(),
        list: dashboard.list_view(),
        years: dashboard.year_view(),
        charts: dashboard.charts(),
    };

    let output = if matches.get_flag("pretty") {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(output)
}
