use std::env;

use anyhow::{bail, Result};

use islay::input::PriceTable;
use islay::simcontext::SimContextBuilder;
use islay::strategy::{Direction, EqualWeightStrategy};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        bail!("Usage: islay_replay <prices.csv> <initial_value> <out_dir> [long|short]");
    }

    let prices_path = &args[1];
    let initial_value: f64 = args[2].parse()?;
    let out_dir = &args[3];
    let direction = match args.get(4).map(|val| val.as_str()) {
        None | Some("long") => Direction::Long,
        Some("short") => Direction::Short,
        Some(other) => bail!("Unknown direction {:?}, expected long or short", other),
    };

    let prices = PriceTable::from_csv_path(prices_path)?;
    let mut sim = SimContextBuilder::new()
        .with_prices(prices)
        .with_strategy(EqualWeightStrategy::new(direction))
        .with_initial_value(initial_value)
        .build()?;

    //History up to the failing day is still worth keeping
    let res = sim.run();
    sim.history().save(out_dir)?;
    res?;

    let perf = sim.perf();
    println!("Final value: {}", perf.final_value);
    println!("Return: {}", perf.ret);
    println!("Volatility: {}", perf.vol);
    println!("Max drawdown: {}", perf.mdd);
    Ok(())
}
