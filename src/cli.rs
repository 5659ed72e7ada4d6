//! Command Line Interface
//!
//! One subcommand per peripheral. Every command loads the configuration,
//! opens the vendor library and prints either plain text or, with `--json`,
//! the record the library returned.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;

use lannerpsp::ffi::{BASE_MINUTE, BASE_SECOND};
use lannerpsp::utils::convert_to_bit_array;
use lannerpsp::{
    logger, ComPort, Dll, Gpio, Gps, GpsStatusLed, Gsr, Hwm, HwmConf, Lcm, LteStatusLed,
    LteStressLed, Poe, Psp, PspConfig, Rfm, Swr, SystemLed, Wdt,
};

#[derive(Parser)]
#[command(name = "lannerpsp")]
#[command(version)]
#[command(about = "Lanner Platform Support Package utilities")]
#[command(long_about = "Lanner Platform Support Package utilities

Reads sensors and drives board peripherals through the vendor
liblmbapi.so. Must run as root.

EXAMPLES:
    lannerpsp dll version                  Show PSP and board library versions
    lannerpsp hwm report                   Hardware monitor table with alarms
    lannerpsp gpio set 0x3                 Drive DO1 and DO2 high
    lannerpsp sled green                   System LED green
    lannerpsp poe status 2                 Power state of LAN2
    lannerpsp wdt enable 30                Arm the watchdog for 30 seconds
    lannerpsp --json poe info              Same data as JSON

ENVIRONMENT VARIABLES:
    LANNERPSP_LOG=debug              Log level (default warn)
    LANNERPSP_LMB_API_PATH=...       Override liblmbapi.so location
    LANNERPSP_LCM_PORT=/dev/ttyS2    LCM serial port

FILES:
    /etc/lanner/lannerpsp.toml          Library paths and LCM settings
    /etc/lanner/hwm.conf                Hardware monitor thresholds
    /var/log/lannerpsp/events.json      Event log written with --logging")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Append every command to the JSON event log
    #[arg(long, global = true)]
    pub logging: bool,

    /// Configuration file in place of /etc/lanner/lannerpsp.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(subcommand, about = "Library versions and BIOS id")]
    Dll(DllCommands),

    #[command(subcommand, about = "Digital input/output pins")]
    Gpio(GpioCommands),

    #[command(subcommand, about = "G-sensor axis data")]
    Gsr(GsrCommands),

    #[command(subcommand, about = "Hardware monitor sensors")]
    Hwm(HwmCommands),

    #[command(subcommand, about = "LCM front panel module")]
    Lcm(LcmCommands),

    #[command(subcommand, about = "Serial port transceiver mode")]
    Com(ComCommands),

    #[command(subcommand, about = "Power over Ethernet ports")]
    Poe(PoeCommands),

    #[command(subcommand, about = "LTE/radio frequency module power and SIM")]
    Rfm(RfmCommands),

    #[command(subcommand, about = "Status LEDs")]
    Sled(SledCommands),

    #[command(subcommand, about = "GPS module")]
    Gps(GpsCommands),

    #[command(subcommand, about = "Software reset button")]
    Swr(SwrCommands),

    #[command(subcommand, about = "Watchdog timer")]
    Wdt(WdtCommands),
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

// ============================================================================
// Subcommands
// ============================================================================

#[derive(Subcommand)]
pub enum DllCommands {
    /// PSP/SDK and board library versions
    Version,
    /// BIOS identification string
    BiosId,
}

#[derive(Subcommand)]
pub enum GpioCommands {
    /// Number of DI/DO pins
    Info,
    /// Current DI and DO state
    Get,
    /// Set all DO pins from a bit mask (decimal or 0x hex)
    Set {
        #[arg(value_parser = parse_int)]
        status: u32,
    },
}

#[derive(Subcommand)]
pub enum GsrCommands {
    /// Axis data in g
    Data,
    /// Calibration offsets
    Offset,
    /// Print several samples, one per second
    Test {
        #[arg(long, default_value_t = 3)]
        rounds: u32,
    },
}

#[derive(Subcommand)]
pub enum HwmCommands {
    /// Full sensor table with alarms
    Report {
        /// hwm.conf to take thresholds from
        #[arg(long, value_name = "FILE")]
        conf: Option<PathBuf>,
    },
    /// Monitor chip type
    Type,
    /// Sensors this board reports
    List,
    /// Read one sensor by id
    Read {
        sid: u32,
        #[arg(long, value_name = "FILE")]
        conf: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum LcmCommands {
    /// Find the port and speed of the module
    SearchPort,
    /// Reset the module
    Reset,
    /// Current keys bitmap
    Keys,
    Backlight { state: Switch },
    /// Write text at a position (row 1-2, column 1-16)
    Write {
        #[arg(long, default_value_t = 1)]
        row: u32,
        #[arg(long, default_value_t = 1)]
        column: u32,
        text: String,
    },
    Clear,
    /// Print key events for a number of seconds
    Watch {
        #[arg(default_value_t = 10)]
        secs: u64,
    },
}

#[derive(Subcommand)]
pub enum ComCommands {
    Info { num: u32 },
    /// Switch to 232, 422 or 485
    Mode { num: u32, mode: u32 },
    Termination { num: u32, state: Switch },
}

#[derive(Subcommand)]
pub enum PoeCommands {
    /// Power state of every port
    Info,
    Enable { num: u32 },
    Disable { num: u32 },
    Status { num: u32 },
}

#[derive(Subcommand)]
pub enum RfmCommands {
    /// Read the module power bits, or set them when a value is given
    Power {
        #[arg(value_parser = parse_int)]
        value: Option<u32>,
    },
    /// Read the SIM select bits, or set them when a value is given
    Sim {
        #[arg(value_parser = parse_int)]
        value: Option<u32>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LteColor {
    Off,
    Red,
    RedBlink,
    Green,
    GreenBlink,
    Yellow,
    YellowBlink,
}

#[derive(Subcommand)]
pub enum SledCommands {
    /// System LED state
    Status,
    Off,
    Green,
    Red,
    /// Cycle the system LED colours
    Test {
        #[arg(default_value_t = 3)]
        secs: u32,
    },
    /// GPS status LED
    Gps { state: GpsLedState },
    /// LTE status LED
    Lte { color: LteColor },
    /// LTE signal strength LED; no value turns it off
    LteStress { percent: Option<u32> },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GpsLedState {
    Off,
    On,
    Blink,
}

#[derive(Subcommand)]
pub enum GpsCommands {
    /// Serial port the GPS module is attached to
    SearchPort,
}

#[derive(Subcommand)]
pub enum SwrCommands {
    /// 1 while the button is held
    Status,
    /// Wait for a press
    Wait {
        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    Test {
        #[arg(default_value_t = 5)]
        secs: u32,
    },
    /// Print button interrupts for a number of seconds
    Watch {
        #[arg(default_value_t = 10)]
        secs: u64,
    },
}

#[derive(Subcommand)]
pub enum WdtCommands {
    Info,
    /// Start counting down
    Enable {
        count: u32,
        /// Count in minutes instead of seconds
        #[arg(long)]
        minutes: bool,
    },
    /// Reload the countdown
    Reset,
    Disable,
}

fn parse_int(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("'{s}': {e}"))
}

// ============================================================================
// Dispatch
// ============================================================================

struct Ctx {
    psp: Psp,
    config: PspConfig,
    json: bool,
}

impl Ctx {
    /// Print `value` as JSON, or `text` otherwise
    fn emit<T: Serialize>(&self, value: &T, text: impl Display) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{text}");
        }
        Ok(())
    }

    fn done(&self, what: &str) -> anyhow::Result<()> {
        self.emit(&json!({ "ok": true, "action": what }), what)
    }
}

pub fn run_cli(cli: &Cli) -> anyhow::Result<()> {
    if cli.logging {
        logger::init_logging();
        logger::log_event("command", json!({ "args": std::env::args().collect::<Vec<_>>() }));
    }

    let config = match &cli.config {
        Some(path) => PspConfig::load_from(path),
        None => PspConfig::load(),
    }
    .context("loading configuration")?;
    let psp = Psp::open(&config)?;
    let ctx = Ctx { psp, config, json: cli.json };

    let result = execute_command(&ctx, &cli.command);
    if cli.logging {
        match &result {
            Ok(()) => logger::log_event("command_ok", json!({})),
            Err(e) => logger::log_event("command_failed", json!({ "error": format!("{e:#}") })),
        }
    }
    result
}

fn execute_command(ctx: &Ctx, cmd: &Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Dll(sub) => cmd_dll(ctx, sub),
        Commands::Gpio(sub) => cmd_gpio(ctx, sub),
        Commands::Gsr(sub) => cmd_gsr(ctx, sub),
        Commands::Hwm(sub) => cmd_hwm(ctx, sub),
        Commands::Lcm(sub) => cmd_lcm(ctx, sub),
        Commands::Com(sub) => cmd_com(ctx, sub),
        Commands::Poe(sub) => cmd_poe(ctx, sub),
        Commands::Rfm(sub) => cmd_rfm(ctx, sub),
        Commands::Sled(sub) => cmd_sled(ctx, sub),
        Commands::Gps(sub) => cmd_gps(ctx, sub),
        Commands::Swr(sub) => cmd_swr(ctx, sub),
        Commands::Wdt(sub) => cmd_wdt(ctx, sub),
    }
}

// ============================================================================
// DLL / GPIO / GSR
// ============================================================================

fn cmd_dll(ctx: &Ctx, cmd: &DllCommands) -> anyhow::Result<()> {
    let dll = Dll::new(&ctx.psp);
    match cmd {
        DllCommands::Version => {
            let version = dll.get_version()?;
            ctx.emit(&version, &version)
        }
        DllCommands::BiosId => {
            let id = dll.get_bios_id()?;
            ctx.emit(&json!({ "bios_id": id }), &id)
        }
    }
}

fn pin_row(prefix: &str, pins: &[bool]) -> String {
    pins.iter()
        .enumerate()
        .map(|(i, high)| format!("{prefix}{}={}", i + 1, u8::from(*high)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn cmd_gpio(ctx: &Ctx, cmd: &GpioCommands) -> anyhow::Result<()> {
    let gpio = Gpio::new(&ctx.psp, true)?;
    match cmd {
        GpioCommands::Info => {
            let info = gpio.get_info()?;
            let text = format!("DI pins: {}\nDO pins: {}", info.number_of_di_pins, info.number_of_do_pins);
            ctx.emit(&info, text)
        }
        GpioCommands::Get => {
            let di = gpio.digital_in_pins()?;
            let dout = gpio.digital_out_pins()?;
            let text = format!("{}\n{}", pin_row("DI", &di), pin_row("DO", &dout));
            ctx.emit(&json!({ "digital_in": di, "digital_out": dout }), text)
        }
        GpioCommands::Set { status } => {
            gpio.set_digital_out(*status)?;
            let bits: String = convert_to_bit_array(u64::from(*status))
                .iter()
                .map(|b| char::from(b'0' + b))
                .collect();
            ctx.done(&format!("DO set to 0b{bits}"))
        }
    }
}

fn cmd_gsr(ctx: &Ctx, cmd: &GsrCommands) -> anyhow::Result<()> {
    let gsr = Gsr::new(&ctx.psp, true)?;
    match cmd {
        GsrCommands::Data => {
            let d = gsr.get_data()?;
            let text = format!("range ±{}g  X={:.4}  Y={:.4}  Z={:.4}", d.g_range, d.mg_x, d.mg_y, d.mg_z);
            ctx.emit(&d, text)
        }
        GsrCommands::Offset => {
            let o = gsr.get_offset()?;
            ctx.emit(&o, format!("X={}  Y={}  Z={}", o.raw_x, o.raw_y, o.raw_z))
        }
        GsrCommands::Test { rounds } => Ok(gsr.test(*rounds, &mut io::stdout())?),
    }
}

// ============================================================================
// Hardware Monitor
// ============================================================================

fn load_hwm_conf(ctx: &Ctx, explicit: Option<&PathBuf>) -> anyhow::Result<HwmConf> {
    let path = explicit.or(ctx.config.hwm_conf_path.as_ref());
    Ok(HwmConf::discover(path.map(PathBuf::as_path))?)
}

fn cmd_hwm(ctx: &Ctx, cmd: &HwmCommands) -> anyhow::Result<()> {
    let hwm = Hwm::new(&ctx.psp)?;
    match cmd {
        HwmCommands::Report { conf } => {
            let conf = load_hwm_conf(ctx, conf.as_ref())?;
            if ctx.json {
                let mut readings = Vec::new();
                for sensor in hwm.list_supported_sensors()? {
                    readings.push(hwm.read_sensor(sensor.sid, &conf)?);
                }
                ctx.emit(&readings, "")
            } else {
                Ok(hwm.report(&conf, &mut io::stdout())?)
            }
        }
        HwmCommands::Type => {
            let t = hwm.sensor_type()?;
            ctx.emit(&json!({ "type": t.to_string() }), t)
        }
        HwmCommands::List => {
            let sensors = hwm.list_supported_sensors()?;
            let text = sensors
                .iter()
                .map(|s| format!("{:3}  {:<24} {}", s.sid, s.name, s.display_name))
                .collect::<Vec<_>>()
                .join("\n");
            ctx.emit(&sensors, text)
        }
        HwmCommands::Read { sid, conf } => {
            let conf = load_hwm_conf(ctx, conf.as_ref())?;
            let reading = hwm.read_sensor(*sid, &conf)?;
            ctx.emit(&reading, reading.row())
        }
    }
}

// ============================================================================
// LCM / COM / PoE / RFM
// ============================================================================

fn cmd_lcm(ctx: &Ctx, cmd: &LcmCommands) -> anyhow::Result<()> {
    let lcm = Lcm::new(&ctx.psp)?.with_config(&ctx.config);
    match cmd {
        LcmCommands::SearchPort => {
            let found = lcm.search_port()?;
            ctx.emit(&json!({ "port": found }), &found)
        }
        LcmCommands::Reset => {
            lcm.reset()?;
            ctx.done("LCM reset")
        }
        LcmCommands::Keys => {
            let keys = lcm.get_keys_status()?;
            ctx.emit(&json!({ "keys": keys }), format!("keys = 0x{keys:02X}"))
        }
        LcmCommands::Backlight { state } => {
            lcm.set_backlight(state.is_on())?;
            ctx.done("LCM backlight set")
        }
        LcmCommands::Write { row, column, text } => {
            lcm.set_cursor(*row, *column)?;
            lcm.write(text)?;
            ctx.done("LCM text written")
        }
        LcmCommands::Clear => {
            lcm.clear()?;
            ctx.done("LCM cleared")
        }
        LcmCommands::Watch { secs } => {
            let json = ctx.json;
            lcm.watch_keys(Duration::from_secs(*secs), |event| print_event(json, &event, &event))?;
            Ok(())
        }
    }
}

fn print_event<T: Serialize>(json: bool, value: &T, text: &dyn Display) {
    if json {
        if let Ok(line) = serde_json::to_string(value) {
            println!("{line}");
        }
    } else {
        println!("{text}");
    }
    let _ = io::stdout().flush();
}

fn cmd_com(ctx: &Ctx, cmd: &ComCommands) -> anyhow::Result<()> {
    match cmd {
        ComCommands::Info { num } => {
            let info = ComPort::new(&ctx.psp, *num)?.get_info()?;
            let text = format!("COM{}: {}, termination {}", info.num, info.mode_str, info.termination_str);
            ctx.emit(&info, text)
        }
        ComCommands::Mode { num, mode } => {
            ComPort::new(&ctx.psp, *num)?.set_mode(*mode)?;
            ctx.done(&format!("COM{num} set to RS-{mode}"))
        }
        ComCommands::Termination { num, state } => {
            ComPort::new(&ctx.psp, *num)?.set_termination(state.is_on())?;
            ctx.done(&format!("COM{num} termination updated"))
        }
    }
}

fn cmd_poe(ctx: &Ctx, cmd: &PoeCommands) -> anyhow::Result<()> {
    match cmd {
        PoeCommands::Info => {
            let info = Poe::get_info(&ctx.psp)?;
            let text = info
                .power_status
                .iter()
                .map(|(port, on)| format!("LAN{port}: {}", if *on { "on" } else { "off" }))
                .collect::<Vec<_>>()
                .join("\n");
            ctx.emit(&info, text)
        }
        PoeCommands::Enable { num } => {
            Poe::new(&ctx.psp, *num, true)?.enable()?;
            ctx.done(&format!("LAN{num} power on"))
        }
        PoeCommands::Disable { num } => {
            Poe::new(&ctx.psp, *num, true)?.disable()?;
            ctx.done(&format!("LAN{num} power off"))
        }
        PoeCommands::Status { num } => {
            let on = Poe::new(&ctx.psp, *num, true)?.get_power_status()?;
            ctx.emit(&json!({ "num": num, "power": on }), format!("LAN{num}: {}", if on { "on" } else { "off" }))
        }
    }
}

fn cmd_rfm(ctx: &Ctx, cmd: &RfmCommands) -> anyhow::Result<()> {
    let rfm = Rfm::new(&ctx.psp, true)?;
    match cmd {
        RfmCommands::Power { value: Some(v) } => {
            rfm.set_power_status(*v)?;
            ctx.done("RFM power set")
        }
        RfmCommands::Power { value: None } => {
            let v = rfm.get_power_status()?;
            ctx.emit(&json!({ "power_status": v }), format!("power = 0x{v:X}"))
        }
        RfmCommands::Sim { value: Some(v) } => {
            rfm.set_sim_status(*v)?;
            ctx.done("RFM SIM set")
        }
        RfmCommands::Sim { value: None } => {
            let v = rfm.get_sim_status()?;
            ctx.emit(&json!({ "sim_status": v }), format!("sim = 0x{v:X}"))
        }
    }
}

// ============================================================================
// LEDs / GPS / SWR / WDT
// ============================================================================

fn cmd_sled(ctx: &Ctx, cmd: &SledCommands) -> anyhow::Result<()> {
    match cmd {
        SledCommands::Status => {
            let status = SystemLed::new(&ctx.psp)?.get_status()?;
            ctx.emit(&json!({ "status": status }), format!("system LED = {status}"))
        }
        SledCommands::Off => {
            SystemLed::new(&ctx.psp)?.off()?;
            ctx.done("system LED off")
        }
        SledCommands::Green => {
            SystemLed::new(&ctx.psp)?.green()?;
            ctx.done("system LED green")
        }
        SledCommands::Red => {
            SystemLed::new(&ctx.psp)?.red()?;
            ctx.done("system LED red")
        }
        SledCommands::Test { secs } => Ok(SystemLed::new(&ctx.psp)?.test(*secs, &mut io::stdout())?),
        SledCommands::Gps { state } => {
            let led = GpsStatusLed::new(&ctx.psp, true)?;
            match state {
                GpsLedState::Off => led.off()?,
                GpsLedState::On => led.on()?,
                GpsLedState::Blink => led.blink()?,
            }
            ctx.done("GPS LED set")
        }
        SledCommands::Lte { color } => {
            let led = LteStatusLed::new(&ctx.psp, true)?;
            match color {
                LteColor::Off => led.off()?,
                LteColor::Red => led.red()?,
                LteColor::RedBlink => led.red_blink()?,
                LteColor::Green => led.green()?,
                LteColor::GreenBlink => led.green_blink()?,
                LteColor::Yellow => led.yellow()?,
                LteColor::YellowBlink => led.yellow_blink()?,
            }
            ctx.done("LTE LED set")
        }
        SledCommands::LteStress { percent } => {
            let led = LteStressLed::new(&ctx.psp, true)?;
            match percent {
                Some(p) => led.set_strength(*p)?,
                None => led.off()?,
            }
            ctx.done("LTE stress LED set")
        }
    }
}

fn cmd_gps(ctx: &Ctx, cmd: &GpsCommands) -> anyhow::Result<()> {
    match cmd {
        GpsCommands::SearchPort => {
            let port = Gps::new(&ctx.psp)?.search_port()?;
            ctx.emit(&json!({ "port": port }), &port)
        }
    }
}

fn cmd_swr(ctx: &Ctx, cmd: &SwrCommands) -> anyhow::Result<()> {
    let swr = Swr::new(&ctx.psp)?;
    match cmd {
        SwrCommands::Status => {
            let status = swr.get_status()?;
            ctx.emit(&json!({ "status": status }), format!("button status = {status}"))
        }
        SwrCommands::Wait { timeout } => {
            let pressed = swr.wait_for_press(timeout.map(Duration::from_secs))?;
            let text = if pressed { "pressed" } else { "timed out" };
            ctx.emit(&json!({ "pressed": pressed }), text)
        }
        SwrCommands::Test { secs } => {
            swr.test(*secs, &mut io::stdout())?;
            Ok(())
        }
        SwrCommands::Watch { secs } => {
            let json = ctx.json;
            swr.watch(Duration::from_secs(*secs), |event| print_event(json, &event, &event))?;
            Ok(())
        }
    }
}

fn cmd_wdt(ctx: &Ctx, cmd: &WdtCommands) -> anyhow::Result<()> {
    let wdt = Wdt::new(&ctx.psp)?;
    match cmd {
        WdtCommands::Info => {
            let info = wdt.get_info()?;
            let text = format!(
                "type: {}\nmax count: {}\nminute unit: {}",
                info.wdt_type,
                info.max_count,
                if info.is_minute_support { "yes" } else { "no" }
            );
            ctx.emit(&info, text)
        }
        WdtCommands::Enable { count, minutes } => {
            let unit = if *minutes { BASE_MINUTE } else { BASE_SECOND };
            wdt.enable(*count, unit)?;
            ctx.done(&format!("watchdog armed for {count} {}", if *minutes { "minutes" } else { "seconds" }))
        }
        WdtCommands::Reset => {
            wdt.reset()?;
            ctx.done("watchdog reset")
        }
        WdtCommands::Disable => {
            wdt.disable()?;
            ctx.done("watchdog disabled")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_tree() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("0x1F").unwrap(), 31);
        assert_eq!(parse_int("12").unwrap(), 12);
        assert!(parse_int("0xZZ").is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lannerpsp", "wdt", "enable", "3", "--minutes", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Wdt(WdtCommands::Enable { count: 3, minutes: true })));
    }

    #[test]
    fn test_gpio_set_hex() {
        let cli = Cli::try_parse_from(["lannerpsp", "gpio", "set", "0x3"]).unwrap();
        assert!(matches!(cli.command, Commands::Gpio(GpioCommands::Set { status: 3 })));
    }

    #[test]
    fn test_lte_color_names() {
        let cli = Cli::try_parse_from(["lannerpsp", "sled", "lte", "green-blink"]).unwrap();
        assert!(matches!(cli.command, Commands::Sled(SledCommands::Lte { color: LteColor::GreenBlink })));
        assert!(Cli::try_parse_from(["lannerpsp", "sled", "lte", "blue"]).is_err());
    }

    #[test]
    fn test_pin_row() {
        assert_eq!(pin_row("DI", &[true, false, true]), "DI1=1 DI2=0 DI3=1");
    }
}
