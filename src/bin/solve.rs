use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;

use rust_2048::{
    Agent, Environment, Format, Game2048, GameConfig, GameRng, PlayEnd, PolicyStore, SolveMethod,
    SolverConfig,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Auto,
    Memoized,
    ValueIteration,
}

impl From<MethodArg> for SolveMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Auto => SolveMethod::Auto,
            MethodArg::Memoized => SolveMethod::Memoized,
            MethodArg::ValueIteration => SolveMethod::ValueIteration,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Bin,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Format::Json,
            FormatArg::Bin => Format::Bincode,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "solve", about = "Explore, solve and save a 2048 policy for a small board")]
struct Args {
    /// Board rows
    #[arg(long, default_value_t = 2)]
    rows: usize,

    /// Board columns
    #[arg(long, default_value_t = 2)]
    cols: usize,

    /// Number of states to discover
    #[arg(long, default_value_t = 400)]
    states: usize,

    /// Tile value that wins
    #[arg(long, default_value_t = 32)]
    target: u32,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Discount factor
    #[arg(long, default_value_t = 0.9)]
    gamma: f64,

    /// Reward for reaching the target
    #[arg(long, default_value_t = 100.0)]
    win_reward: f64,

    /// Directory for the policy file
    #[arg(long, default_value = "policies")]
    out: PathBuf,

    /// Policy file format
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,

    /// Solver algorithm
    #[arg(long, value_enum, default_value_t = MethodArg::Auto)]
    method: MethodArg,

    /// Replay one greedy episode after solving
    #[arg(long)]
    play: bool,

    /// Move limit for --play
    #[arg(long, default_value_t = 1000)]
    max_moves: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = GameConfig::default()
        .with_dims(args.rows, args.cols)
        .with_target(args.target)
        .with_seed(args.seed)
        .with_gamma(args.gamma)
        .with_win_reward(args.win_reward);
    config.validate()?;

    let mut env = Game2048::new(config.clone())?;
    let mut rng = GameRng::new(config.seed);
    let mut agent = Agent::new(config)?
        .with_solver_config(SolverConfig::default().with_method(args.method.into()));

    let explored = agent.train(&mut env, args.states, &mut rng)?;
    info!(
        "exploration took {:.2}s over {} episodes",
        explored.time_us as f64 / 1e6,
        explored.episodes
    );

    let solved = agent.create_policy(&env)?;
    info!(
        "solving took {:.2}s ({} states, {:?})",
        solved.time_us as f64 / 1e6,
        solved.states_solved,
        solved.method
    );

    let store = PolicyStore::new(args.out.clone()).with_format(args.format.into());
    let path = agent.save(&store)?;
    println!("{}", path.display());

    if let Some(start) = env.canonical_start_state() {
        println!("start {} value {:.4}", start, agent.state_value(start)?);
    }

    if args.play {
        replay(&agent, &mut env, &mut rng, args.max_moves)?;
    }

    Ok(())
}

fn replay(
    agent: &Agent,
    env: &mut Game2048,
    rng: &mut GameRng,
    max_moves: usize,
) -> anyhow::Result<()> {
    let outcome = agent.play(env, rng, max_moves)?;
    let (rows, cols) = (agent.config().rows, agent.config().cols);

    for step in &outcome.trace {
        println!("{}", step.state.decode(rows, cols)?);
        println!("{} {:.4}\n", step.action.arrow(), step.value);
    }
    println!("{}", outcome.final_state.decode(rows, cols)?);

    match &outcome.end {
        PlayEnd::Won => println!("won after {} moves", outcome.moves),
        PlayEnd::Lost => println!("lost after {} moves", outcome.moves),
        PlayEnd::MoveLimit => println!("stopped at the {} move limit", outcome.moves),
        PlayEnd::Unexplored(id) => println!("reached unexplored state {}", id),
    }
    Ok(())
}
