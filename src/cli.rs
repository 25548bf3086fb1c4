use std::process;

use crate::analyze_all_pairs;
use crate::im3;
use crate::interference::{BlockingResult, InducedResult, InterferenceResult};
use crate::load_site;
use crate::Site;

pub struct Config {}

impl Config {
    pub fn run(args: &[String]) -> Result<Config, Box<dyn std::error::Error>> {
        if args.len() < 2 {
            return Err("not enough arguments".into());
        }

        if args.len() > 2 {
            return Err(
                "too many arguments, expecting only 2, such as `localems filepath`".into(),
            );
        }

        // Check for special flags
        match args[1].as_str() {
            "--version" | "-v" => {
                print_version();
                process::exit(0);
            }
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            _ => {}
        }

        init_tracing();

        let cwd = std::env::current_dir()?;
        // cargo run arg[1], such as cargo run files/site.toml
        // localems arg[1], such as localems files/site.toml
        let file_path = args[1].clone();
        println!("Site Config Path: {}", file_path);
        let full_path_to_site = cwd.join(file_path);
        println!("Full Path: {}", full_path_to_site.display());

        let site = load_site(&full_path_to_site)?;

        print_site_summary(&site);
        print_pairwise_analysis(&site);
        print_im3_analysis(&site);

        Ok(Config {})
    }
}

#[cfg(feature = "cli")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

#[cfg(not(feature = "cli"))]
fn init_tracing() {}

pub fn print_site_summary(site: &Site) {
    println!();
    println!("Site: {}", site.name);
    println!(
        "{} transmitter(s), {} receiver(s)",
        site.transmitters.len(),
        site.receivers.len()
    );
}

pub fn print_pairwise_analysis(site: &Site) {
    println!();
    println!("Local EMC analysis");
    println!("------------------");

    for report in analyze_all_pairs(site) {
        println!();
        println!(
            "TX #{} -> RX #{}: {} -> {}",
            report.tx_index + 1,
            report.rx_index + 1,
            site.transmitters[report.tx_index].unit.device_name,
            site.receivers[report.rx_index].unit.device_name,
        );
        match report.outcome {
            Ok(result) => print_pair_result(&result),
            Err(e) => println!("  Analysis error: {e}"),
        }
    }
}

pub fn print_pair_result(result: &InterferenceResult) {
    // the formatting `{:>8.2}` aligns positive and negative numbers on the
    // decimal, with two digits after the decimal (hundredths place)
    println!("  Distance:\t\t{:>8.1} m", result.distance_m);
    println!(
        "  gt = {:.2} dBi, gr = {:.2} dBi",
        result.gt_dbi, result.gr_dbi
    );
    println!("  FSPL:\t\t\t{:>8.2} dB", result.fspl_db);
    println!(
        "  Level without EN/ACS:\t{:>8.2} dBm",
        result.desired_power_dbm
    );
    println!(
        "  Pint with EN/ACS:\t{:>8.2} dBm",
        result.interference.level_dbm
    );

    match &result.blocking {
        BlockingResult::Evaluated(check) => {
            println!(
                "  Blocking: df = {:.2} MHz, threshold = {:.2} MHz",
                check.freq_offset_mhz, check.limit_mhz
            );
            println!(
                "    -> Pblock = {:>8.2} dBm, threshold = {:>8.2} dBm",
                check.power_dbm, check.threshold_dbm
            );
            println!(
                "    {}",
                if check.passed {
                    "Allowed"
                } else {
                    "Exceeds allowed level!"
                }
            );
        }
        BlockingResult::OutsideOffsetWindow {
            freq_offset_mhz,
            limit_mhz,
        } => println!(
            "  Blocking: df = {:.2} MHz exceeds threshold {:.2} MHz -> not considered",
            freq_offset_mhz, limit_mhz
        ),
        BlockingResult::MissingParameters => {
            println!("  Blocking: receiver declares no blocking parameters")
        }
    }

    match &result.induced {
        InducedResult::Evaluated(check) => {
            println!(
                "  Induced: distance = {:.1} m, wavelength = {:.2} m",
                check.distance_m, check.wavelength_m
            );
            println!(
                "    -> Pind = {:>8.2} dBm, threshold = {:>8.2} dBm",
                check.power_dbm, check.threshold_dbm
            );
            println!(
                "    {}",
                if check.passed {
                    "Allowed"
                } else {
                    "Exceeds allowed level!"
                }
            );
        }
        InducedResult::NotConsidered {
            distance_m,
            limit_m,
            ..
        } => println!(
            "  Induced: distance = {:.1} m >= {:.1} m -> not considered",
            distance_m, limit_m
        ),
    }
}

pub fn print_im3_analysis(site: &Site) {
    println!();
    println!("Third-order intermodulation analysis");
    println!("------------------------------------");

    if site.transmitters.len() < 2 {
        println!("At least two transmitters are needed for intermodulation analysis.");
        return;
    }

    let selected: Vec<usize> = (0..site.transmitters.len()).collect();

    for (rx_index, rx) in site.receivers.iter().enumerate() {
        println!();
        println!(
            "RX #{} ({} MHz):",
            rx_index + 1,
            rx.unit.frequency_mhz
        );

        let assessments = match im3::assess_candidates(&site.transmitters, &selected, rx) {
            Ok(assessments) => assessments,
            Err(e) => {
                println!("  Analysis error: {e}");
                continue;
            }
        };

        for assessment in assessments {
            let candidate = assessment.candidate;
            println!(
                "  2f{} - f{} = {:.2} MHz (df = {:.2} MHz){}",
                candidate.primary + 1,
                candidate.secondary + 1,
                candidate.frequency_mhz,
                assessment.delta_f_mhz,
                if assessment.near { " [near]" } else { "" }
            );

            match im3::estimate_level(
                &site.transmitters[candidate.primary],
                &site.transmitters[candidate.secondary],
                rx,
                candidate.frequency_mhz,
            ) {
                Ok(estimate) if estimate.exceeds_threshold => println!(
                    "    -> IM level above sensitivity margin ({:.0} dBm): {:.2} dBm",
                    estimate.threshold_dbm, estimate.level_dbm
                ),
                Ok(estimate) => println!(
                    "    -> IM level estimate: {:.2} dBm",
                    estimate.level_dbm
                ),
                Err(e) => println!("    -> Error calculating IM level: {e}"),
            }
        }
    }
}

pub fn print_version() {
    println!("localems {}", env!("CARGO_PKG_VERSION"));
}

pub fn print_error(error: &str) {
    const RED: &str = "\x1b[31m";
    const RESET: &str = "\x1b[0m";
    println!("{}Problem parsing arguments: {error}{}", RED, RESET);
}

pub fn print_help() {
    // ANSI color codes
    const BOLD: &str = "\x1b[1m";
    const CYAN: &str = "\x1b[36m";
    const GREEN: &str = "\x1b[32m";
    const YELLOW: &str = "\x1b[33m";
    const RESET: &str = "\x1b[0m";

    println!(
        "📡 Local EMC analyzer - https://github.com/iancleary/localems{}",
        RESET
    );
    println!();
    println!("{}{}VERSION:{}", BOLD, YELLOW, RESET);
    println!("    {}{}{}", GREEN, env!("CARGO_PKG_VERSION"), RESET);
    println!();
    println!("{}{}USAGE:{}", BOLD, YELLOW, RESET);
    println!("    {} localems <FILE_PATH>{}", GREEN, RESET);
    println!();
    println!("     FILE_PATH: path to a toml site file");
    println!();
    println!("     The site file lists transmitters, receivers, and an antenna");
    println!("     library; every TX/RX pair is analyzed for interference,");
    println!("     blocking, induced coupling, and IM3 products.");
    println!();
    println!("{}{}OPTIONS:{}", BOLD, YELLOW, RESET);
    println!(
        "    {}  -v, --version{}{}    Print version information",
        GREEN, RESET, RESET
    );
    println!(
        "    {}  -h, --help{}{}       Print help information",
        GREEN, RESET, RESET
    );
    println!();
    println!("{}{}EXAMPLES:{}", BOLD, YELLOW, RESET);
    println!("    {} # Single file (Relative path){}", CYAN, RESET);
    println!("    {} localems files/site.toml{}", GREEN, RESET);
    println!();
}
