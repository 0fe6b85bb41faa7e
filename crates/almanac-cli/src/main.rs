//! `almanac`: lunar calendar lookups and alarm fire times from the shell.

use std::fs;
use std::path::PathBuf;

use almanac_engine::alarm::{
    next_fire_time_with_options, AlarmIdGenerator, AlarmKind, AlarmRuleBuilder, HolidayFallback,
    NextFireOptions,
};
use almanac_engine::astrology::western_zodiac_info;
use almanac_engine::holiday::{parse_holiday_response, HolidayCache, StaticHolidaySource};
use almanac_engine::lunar::{
    clash_chinese_zodiac, current_solar_term, date_subtitle, eight_chars, lunar_date_info,
    lunar_festival_info, solar_terms_date_list, time_lucky_list,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flexi_logger::Logger;
use log::debug;
use serde_json::{json, Value};

/// Chinese calendar lookups and alarm scheduling.
#[derive(Parser, Debug)]
#[command(name = "almanac", version, about, long_about = None)]
struct Cli {
    #[clap(flatten)]
    global_opts: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    /// Log level written to stderr. `RUST_LOG` takes precedence when set.
    #[arg(global = true, long, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Everything known about one day: lunar date, solar term, eight
    /// characters, festival, zodiac and auspicious hours.
    Day(DayArgs),
    /// The 24 solar terms of a year.
    Terms(TermsArgs),
    /// When an alarm fires next.
    Next(NextArgs),
}

#[derive(Args, Debug)]
struct DayArgs {
    /// Gregorian date, YYYY-MM-DD.
    date: NaiveDate,

    /// Time of day for the hour pillar, HH:MM.
    #[arg(long, value_parser = parse_time, default_value = "12:00")]
    time: NaiveTime,
}

#[derive(Args, Debug)]
struct TermsArgs {
    year: i32,
}

#[derive(Args, Debug)]
struct NextArgs {
    #[arg(long, value_enum)]
    kind: KindArg,

    /// Time of day the alarm rings, HH:MM.
    #[arg(long, value_parser = parse_time)]
    time: NaiveTime,

    /// Date of a one-time alarm, YYYY-MM-DD.
    #[arg(long)]
    day: Option<NaiveDate>,

    /// Weekday of a weekly alarm, e.g. `mon`.
    #[arg(long)]
    weekday: Option<Weekday>,

    /// Day of month of a monthly or yearly alarm.
    #[arg(long)]
    month_day: Option<u32>,

    /// Month of a yearly alarm.
    #[arg(long)]
    month: Option<u32>,

    /// Reference instant, YYYY-MM-DDTHH:MM[:SS].
    #[arg(long, value_parser = parse_date_time)]
    after: NaiveDateTime,

    /// Holiday calendar in the holiday API's JSON format. Without it only
    /// weekends count as days off.
    #[arg(long)]
    holidays: Option<PathBuf>,

    /// What to do when a holiday lookup fails.
    #[arg(long, value_enum, default_value_t = FallbackArg::Weekend)]
    fallback: FallbackArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    OneTime,
    WorkDay,
    EveryDay,
    EveryWeek,
    EveryMonth,
    EveryYear,
}

impl From<KindArg> for AlarmKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::OneTime => AlarmKind::OneTime,
            KindArg::WorkDay => AlarmKind::WorkDay,
            KindArg::EveryDay => AlarmKind::EveryDay,
            KindArg::EveryWeek => AlarmKind::EveryWeek,
            KindArg::EveryMonth => AlarmKind::EveryMonth,
            KindArg::EveryYear => AlarmKind::EveryYear,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FallbackArg {
    Weekend,
    Holiday,
    Propagate,
}

impl From<FallbackArg> for HolidayFallback {
    fn from(fallback: FallbackArg) -> Self {
        match fallback {
            FallbackArg::Weekend => HolidayFallback::Weekend,
            FallbackArg::Holiday => HolidayFallback::TreatAsHoliday,
            FallbackArg::Propagate => HolidayFallback::Propagate,
        }
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
}

fn parse_date_time(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
}

// ── Commands ────────────────────────────────────────────────────────────────

fn day(args: DayArgs) -> Result<Value> {
    let date = args.date;
    let lunar = lunar_date_info(date).map(|info| {
        json!({
            "year": info.year(),
            "month": info.month(),
            "day": info.day,
            "leap": info.is_leap(),
            "month_name": info.year_month.full_name(),
            "day_name": info.day_name(),
        })
    });
    let solar_term = current_solar_term(date).map(|(term, day)| {
        json!({
            "name": term.kind.name(),
            "date": term.date.to_string(),
            "day": day,
        })
    });
    let chars = eight_chars(date.and_time(args.time));
    let pillars = chars.as_ref().map(|c| {
        json!({
            "year": c.year.name(),
            "month": c.month.name(),
            "day": c.day.name(),
            "hour": c.hour.name(),
        })
    });
    let western = western_zodiac_info(date);
    let lucky_hours: Vec<Value> = time_lucky_list(date)
        .iter()
        .map(|slot| json!({ "time": slot.time.name(), "lucky": slot.lucky_name() }))
        .collect();

    Ok(json!({
        "date": date.to_string(),
        "lunar": lunar,
        "solar_term": solar_term,
        "eight_chars": pillars,
        "zodiac": chars.as_ref().map(|c| c.zodiac.name()),
        "clash": chars.as_ref().map(|c| clash_chinese_zodiac(c.day_zodiac().index).name()),
        "festival": lunar_festival_info(date).map(|f| f.name),
        "subtitle": date_subtitle(date),
        "western_zodiac": {
            "name": western.name(),
            "start_date": western.start_date.to_string(),
        },
        "lucky_hours": lucky_hours,
    }))
}

fn terms(args: TermsArgs) -> Result<Value> {
    let list = solar_terms_date_list(args.year);
    anyhow::ensure!(!list.is_empty(), "no solar term data for {}", args.year);
    Ok(Value::Array(
        list.iter()
            .map(|t| json!({ "name": t.kind.name(), "date": t.date.to_string() }))
            .collect(),
    ))
}

fn next(args: NextArgs) -> Result<Option<NaiveDateTime>> {
    let mut builder = AlarmRuleBuilder::new(AlarmIdGenerator::new().next_id_now())
        .kind(args.kind.into())
        .trigger_time(args.time);
    if let Some(day) = args.day {
        builder = builder.trigger_day(day);
    }
    if let Some(weekday) = args.weekday {
        builder = builder.trigger_weekday(weekday);
    }
    if let Some(month_day) = args.month_day {
        builder = builder.trigger_month_day(month_day);
    }
    if let Some(month) = args.month {
        builder = builder.trigger_month(month);
    }
    let rule = builder.build().context("invalid alarm")?;

    let holidays = match &args.holidays {
        Some(path) => {
            let body = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse_holiday_response(&body)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => Vec::new(),
    };
    debug!("event=cli_next module=cli status=ok holidays={}", holidays.len());
    let oracle = HolidayCache::new(StaticHolidaySource::new(holidays));

    let options = NextFireOptions {
        fallback: args.fallback.into(),
    };
    next_fire_time_with_options(&rule, args.after, &oracle, &options)
        .context("failed to compute next fire time")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _logger = Logger::try_with_env_or_str(&cli.global_opts.log_level)
        .context("invalid log level")?
        .log_to_stderr()
        .start()
        .context("failed to start logger")?;
    debug!("event=cli_start module=cli status=ok command={:?}", cli.command);

    match cli.command {
        Commands::Day(args) => println!("{}", serde_json::to_string_pretty(&day(args)?)?),
        Commands::Terms(args) => println!("{}", serde_json::to_string_pretty(&terms(args)?)?),
        Commands::Next(args) => match next(args)? {
            Some(at) => println!("{}", at.format("%Y-%m-%dT%H:%M:%S")),
            None => println!("none"),
        },
    }
    Ok(())
}
