//! Full-control analysis of a microwave oven.
//!
//! The oven stops heating on its own when its timer elapses, and rings.
//! Three mental models of the oven are checked against it:
//! - a faithful one,
//! - one that does not expect the ring (automation surprise),
//! - one that believes heating can be paused.
//!
//! Run with: `cargo run --example full_control`
//! With options: `cargo run --example full_control -- --exact --verbose`

use clap::Parser;
use hmi_lts::action::Action;
use hmi_lts::check::{CheckConfig, CommandPolicy, FullControlCheck};
use hmi_lts::hmi::{HmiLts, Transition};

#[derive(Parser, Debug)]
#[command(name = "full_control")]
#[command(about = "Check mental models of a microwave oven for full control")]
struct Args {
    /// Require the operator to know every available command
    #[arg(short, long)]
    exact: bool,

    /// Show the analysis steps
    #[arg(short, long)]
    verbose: bool,
}

fn microwave() -> color_eyre::Result<HmiLts> {
    let mut m = HmiLts::new("Idle")?;
    m.add_state("Heating")?;
    m.add_state("Elapsed")?;
    m.add_transition(Transition::new("start", Action::command("start")), "Idle", "Heating")?;
    m.add_transition(Transition::new("cancel", Action::command("cancel")), "Heating", "Idle")?;
    m.add_tau_transition(Transition::new("timer", Action::tau("timer")), "Heating", "Elapsed")?;
    m.add_transition(Transition::new("ding", Action::observation("ding")), "Elapsed", "Idle")?;
    Ok(m)
}

fn mental_models() -> color_eyre::Result<Vec<(&'static str, HmiLts)>> {
    let base = || -> color_eyre::Result<HmiLts> {
        let mut m = HmiLts::new("Off")?;
        m.add_state("On")?;
        m.add_transition(Transition::new("start", Action::command("start")), "Off", "On")?;
        Ok(m)
    };

    let mut faithful = base()?;
    faithful.add_transition(Transition::new("cancel", Action::command("cancel")), "On", "Off")?;
    faithful.add_transition(Transition::new("ding", Action::observation("ding")), "On", "Off")?;

    let mut surprised = base()?;
    surprised.add_transition(Transition::new("cancel", Action::command("cancel")), "On", "Off")?;

    let mut pausing = base()?;
    pausing.add_state("Paused")?;
    pausing.add_transition(Transition::new("ding", Action::observation("ding")), "On", "Off")?;
    pausing.add_transition(Transition::new("pause", Action::command("pause")), "On", "Paused")?;
    pausing.add_transition(Transition::new("resume", Action::command("start")), "Paused", "On")?;

    Ok(vec![
        ("faithful", faithful),
        ("surprised", surprised),
        ("pausing", pausing),
    ])
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let system = microwave()?;
    println!("system = {:?}", system.lts());
    println!("alphabet = {:?}", system.alphabet().names());

    let config = CheckConfig {
        commands: if args.exact {
            CommandPolicy::Exact
        } else {
            CommandPolicy::Included
        },
    };
    let check = FullControlCheck::with_config(&system, config);

    for (name, mental) in mental_models()? {
        println!("{}: {}", name, check.analyse(&mental));
    }

    Ok(())
}
