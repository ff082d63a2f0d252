use anyhow::{Context, Result, bail};
use itertools::Itertools;

use pn_reach::compare;
use pn_reach::config::ReachConfig;
use pn_reach::explicit::{StateGraph, StateGraphConfig};
use pn_reach::net::{io, pnml};
use pn_reach::options::Options;

fn main() -> Result<()> {
    if std::env::var("PN_REACH_LOG").is_ok() {
        let e = env_logger::Env::new()
            .filter("PN_REACH_LOG")
            .write_style("PN_REACH_LOG_STYLE");
        env_logger::init_from_env(e);
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = if args.is_empty() {
        Options::parse_from_str(&std::env::var("PN_REACH_FLAGS").unwrap_or_default())?
    } else {
        Options::parse_from_args(&args)?
    };
    log::debug!("options: {:?}", options);

    let mut config = ReachConfig::load_from_file(&options.config)?;
    if options.max_iterations.is_some() {
        config.max_iterations = options.max_iterations;
    }
    log::debug!("config: {:?}", config);

    let net = pnml::read_pnml(&options.net, config.marking_policy)
        .with_context(|| format!("Failed to load net: {:?}", options.net))?;
    net.log_diagnostics();

    if let Some(path) = &options.dot_net {
        net.write_dot(path)
            .with_context(|| format!("Failed to write net DOT: {:?}", path))?;
    }

    let outcome = compare::run(&net, &config)?;
    let comparison = &outcome.comparison;

    println!(
        "{}: {} places, {} transitions",
        options.net.display(),
        comparison.net.places,
        comparison.net.transitions
    );
    println!(
        "symbolic: {} reachable markings ({} iterations, {} nodes, {:.3} ms)",
        comparison.symbolic.count,
        comparison.symbolic.iterations,
        comparison.symbolic.reachable_nodes,
        comparison.symbolic.elapsed_ms
    );
    for run in &comparison.explicit {
        println!(
            "{}: {} reachable markings{} ({:.3} ms)",
            run.strategy,
            run.count,
            if run.truncated { " (truncated)" } else { "" },
            run.elapsed_ms
        );
    }

    if options.list {
        for marking in outcome.reachable.markings() {
            let marked = marking
                .marked_places()
                .map(|place| net.place(place).label())
                .join(", ");
            println!("  {{{}}}", marked);
        }
    }

    if let Some(path) = &options.output {
        io::write_json(path, comparison)
            .with_context(|| format!("Failed to write report: {:?}", path))?;
    }

    if let Some(path) = &options.dot_graph {
        let graph = StateGraph::with_config(
            &net,
            StateGraphConfig {
                rule: config.enabling_rule,
                state_limit: config.state_limit,
            },
        );
        graph
            .write_dot(path)
            .with_context(|| format!("Failed to write state graph: {:?}", path))?;
    }

    if !comparison.agree {
        bail!("symbolic and explicit reachability disagree");
    }
    Ok(())
}
