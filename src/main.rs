// ==========================================
// 苗圃排苗系统 - 命令行入口
// ==========================================
// 职责: 参数解析、装配 ConfigManager + NurseryClient + ReconcileApi
// 输出: 结果写 stdout（文本/CSV/JSON）,日志写 stderr
// ==========================================

use std::error::Error;
use std::io;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use nursery_slot_planner::api::{NurseryClient, ReconcileApi, SlotOverview};
use nursery_slot_planner::config::{get_default_db_path, ConfigManager, ConfigScope};
use nursery_slot_planner::domain::date::{format_day, parse_day};
use nursery_slot_planner::domain::{OrderRequest, SowingEntry};
use nursery_slot_planner::engine::SlotReminder;
use nursery_slot_planner::i18n::{self, priority_label, t, t_with_args};
use nursery_slot_planner::logging::{self, LogFormat};
use nursery_slot_planner::{export, APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "nursery-slot-planner", version, about = "苗圃批次缺口对账与播种提醒")]
struct Cli {
    /// 本地配置库路径（默认: NURSERY_SLOTS_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 界面语言: zh-CN / en
    #[arg(long, global = true, default_value = "zh-CN")]
    locale: String,

    /// 日志输出为 JSON
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SubtypeArgs {
    #[arg(long)]
    plant: String,
    #[arg(long)]
    subtype: String,
}

#[derive(Subcommand)]
enum Command {
    /// 本地配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    #[command(flatten)]
    Remote(RemoteCommand),
}

/// 需要访问远程服务的命令
#[derive(Subcommand)]
enum RemoteCommand {
    /// 品种批次总览（缺口/优先级/月度汇总）
    Overview {
        #[command(flatten)]
        target: SubtypeArgs,
        /// 判定基准日 DD-MM-YYYY（默认今天）
        #[arg(long)]
        today: Option<String>,
        /// 输出 CSV 批次明细
        #[arg(long)]
        csv: bool,
        /// 与 --csv 一起使用时输出月度汇总
        #[arg(long)]
        months: bool,
        /// 输出 JSON
        #[arg(long)]
        json: bool,
    },
    /// 需要处理的播种提醒
    Reminders {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        today: Option<String>,
        #[arg(long)]
        csv: bool,
    },
    /// 查询某批次的可调入目标
    TransferTargets {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        slot: String,
    },
    /// 提交调拨（先本地校验数量）
    Transfer {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        quantity: i64,
    },
    /// 设置批次育苗天数
    SetReadyDays {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        days: i64,
    },
    /// 设置批次可供苗数
    SetTotal {
        #[arg(long)]
        slot: String,
        #[arg(long)]
        total: i64,
    },
    /// 日期 → 批次
    ResolveDate {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        day: String,
    },
    /// 下单
    Order {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        farmer: String,
        #[arg(long)]
        quantity: i64,
        #[arg(long)]
        dealer: Option<String>,
    },
    /// 播种登记
    Sow {
        #[command(flatten)]
        target: SubtypeArgs,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        quantity: i64,
        /// 播种日期 DD-MM-YYYY（默认今天）
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Get {
        key: String,
        /// 作物级配置
        #[arg(long)]
        plant: Option<String>,
    },
    Set {
        key: String,
        value: String,
        #[arg(long)]
        plant: Option<String>,
    },
    Unset {
        key: String,
        #[arg(long)]
        plant: Option<String>,
    },
    List {
        #[arg(long)]
        plant: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_with_format(if cli.json_log {
        LogFormat::Json
    } else {
        LogFormat::Text
    });
    i18n::set_locale(&cli.locale);

    tracing::debug!("{} v{}", APP_NAME, VERSION);

    let db_path = cli.db.clone().unwrap_or_else(get_default_db_path);
    tracing::debug!("使用配置库: {}", db_path);
    let config = Arc::new(ConfigManager::new(&db_path).map_err(boxed)?);

    match cli.command {
        Command::Config { action } => run_config(&config, action),
        Command::Remote(command) => {
            let settings = config.load_settings().map_err(boxed)?;
            let client = NurseryClient::from_settings(&settings)?;
            let api = ReconcileApi::new(Arc::new(client), config);
            run(&api, command).await
        }
    }
}

async fn run(api: &ReconcileApi, command: RemoteCommand) -> Result<()> {
    match command {
        RemoteCommand::Overview {
            target,
            today,
            csv,
            months,
            json,
        } => {
            let today = today_or(today.as_deref())?;
            let overview = api.slot_overview(&target.plant, &target.subtype, today).await?;
            if csv && months {
                export::write_rollup_csv(&overview, io::stdout())?;
            } else if csv {
                export::write_overview_csv(&overview, io::stdout())?;
            } else if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
            } else {
                print_overview(&overview);
            }
        }
        RemoteCommand::Reminders { target, today, csv } => {
            let today = today_or(today.as_deref())?;
            let reminders = api.reminders(&target.plant, &target.subtype, today).await?;
            if csv {
                export::write_reminders_csv(&reminders, io::stdout())?;
            } else if reminders.is_empty() {
                println!("{}", t("reminders.none"));
            } else {
                print_reminders(&reminders);
            }
        }
        RemoteCommand::TransferTargets { target, slot } => {
            let resp = api.transfer_targets(&target.plant, &target.subtype, &slot).await?;
            println!(
                "{}",
                t_with_args("transfer.surplus", &[("surplus", &resp.source_surplus.to_string())])
            );
            if resp.is_empty() {
                println!("{}", t("transfer.no_targets"));
            }
            for o in &resp.options {
                println!(
                    "{:<12} {:<10} {:<10} {:>+5}d  gap={}",
                    o.slot_id, o.start_day, o.end_day, o.days_difference, o.gap
                );
            }
        }
        RemoteCommand::Transfer {
            target,
            from,
            to,
            quantity,
        } => {
            let source = api.get_slot(&target.plant, &target.subtype, &from).await?;
            let targets = api.transfer_targets_for(&source).await?;
            let option = targets
                .options
                .iter()
                .find(|o| o.slot_id == to)
                .ok_or_else(|| anyhow!(t_with_args("transfer.target_not_found", &[("slot_id", &to)])))?;

            api.submit_transfer(&source, option, quantity).await?;
            println!(
                "{}",
                t_with_args("transfer.submitted", &[("quantity", &quantity.to_string())])
            );
        }
        RemoteCommand::SetReadyDays { slot, days } => {
            api.set_plant_ready_days(&slot, days).await?;
            println!("{}", t_with_args("slot.updated", &[("slot_id", &slot)]));
        }
        RemoteCommand::SetTotal { slot, total } => {
            api.set_total_plants(&slot, total).await?;
            println!("{}", t_with_args("slot.updated", &[("slot_id", &slot)]));
        }
        RemoteCommand::ResolveDate { target, day } => {
            let resolved = api.resolve_date(&target.plant, &target.subtype, &day).await?;
            match &resolved.slot_id {
                Some(slot_id) => println!(
                    "{}",
                    t_with_args("slot.resolved", &[("day", &resolved.day), ("slot_id", slot_id)])
                ),
                None => println!("{}", t_with_args("slot.not_selectable", &[("day", &resolved.day)])),
            }
        }
        RemoteCommand::Order {
            target,
            slot,
            farmer,
            quantity,
            dealer,
        } => {
            let order = OrderRequest {
                slot_id: slot,
                plant_id: target.plant,
                subtype_id: target.subtype,
                farmer_name: farmer,
                quantity,
                dealer_id: dealer,
            };
            api.place_order(&order).await?;
            println!(
                "{}",
                t_with_args(
                    "order.submitted",
                    &[("slot_id", &order.slot_id), ("quantity", &order.quantity.to_string())]
                )
            );
        }
        RemoteCommand::Sow {
            target,
            slot,
            quantity,
            date,
        } => {
            let sowing_date = format_day(today_or(date.as_deref())?);
            let entry = SowingEntry {
                slot_id: slot,
                plant_id: target.plant,
                subtype_id: target.subtype,
                quantity,
                sowing_date,
            };
            api.record_sowing(&entry).await?;
            println!(
                "{}",
                t_with_args(
                    "sowing.recorded",
                    &[
                        ("slot_id", &entry.slot_id),
                        ("quantity", &entry.quantity.to_string()),
                        ("date", &entry.sowing_date),
                    ]
                )
            );
        }
    }
    Ok(())
}

fn run_config(config: &ConfigManager, action: ConfigAction) -> Result<()> {
    let scope = |plant: Option<String>| match plant {
        Some(plant_id) => ConfigScope::Plant { plant_id },
        None => ConfigScope::Global,
    };

    match action {
        ConfigAction::Get { key, plant } => {
            let values = config.list_configs(&scope(plant)).map_err(boxed)?;
            match values.get(&key) {
                Some(v) => println!("{}", v),
                None => println!("{}", t_with_args("config.not_set", &[("key", &key)])),
            }
        }
        ConfigAction::Set { key, value, plant } => {
            config
                .set_config_value(&scope(plant), &key, &value)
                .map_err(boxed)?;
            println!(
                "{}",
                t_with_args("config.updated", &[("key", &key), ("value", &value)])
            );
        }
        ConfigAction::Unset { key, plant } => {
            if !config.remove_config_value(&scope(plant), &key).map_err(boxed)? {
                println!("{}", t_with_args("config.not_set", &[("key", &key)]));
            }
        }
        ConfigAction::List { plant } => {
            for (k, v) in config.list_configs(&scope(plant)).map_err(boxed)? {
                println!("{} = {}", k, v);
            }
        }
    }
    Ok(())
}

fn print_overview(overview: &SlotOverview) {
    println!(
        "{}",
        t_with_args(
            "overview.title",
            &[("subtype", &overview.subtype_name), ("date", &overview.as_of)]
        )
    );
    print_reminders(&overview.rows);

    println!();
    println!(
        "{:<16} {:>6} {:>8} {:>8} {:>8} {:>7}",
        t("overview.month_header"),
        "slots",
        "booked",
        "sowed",
        "gap",
        "%"
    );
    let rows = overview.months.iter().map(|r| (r.label.clone(), r));
    let total = std::iter::once((t("overview.total"), &overview.total));
    for (label, r) in rows.chain(total) {
        println!(
            "{:<16} {:>6} {:>8} {:>8} {:>8} {:>6.1}%",
            label, r.slot_count, r.booked, r.sowed, r.gap, r.percent_complete
        );
    }

    if !overview.skipped_slot_ids.is_empty() {
        println!(
            "{}",
            t_with_args("overview.skipped", &[("ids", &overview.skipped_slot_ids.join(", "))])
        );
    }
}

fn print_reminders(reminders: &[SlotReminder]) {
    for r in reminders {
        println!(
            "{:<12} {:<10} {:<10} gap={:>6}  {:<12} sow-by={}",
            r.slot_id,
            r.start_day,
            r.end_day,
            r.gap.gap,
            priority_label(r.priority),
            r.sow_by_date.map(format_day).unwrap_or_else(|| "-".to_string()),
        );
    }
}

fn today_or(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(s) => parse_day(s).with_context(|| format!("日期格式无效（应为 DD-MM-YYYY）: {}", s)),
        None => Ok(Local::now().date_naive()),
    }
}

fn boxed(e: Box<dyn Error>) -> anyhow::Error {
    anyhow!("{}", e)
}
