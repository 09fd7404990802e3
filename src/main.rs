use clap::Parser;
use log::{error, info};
use std::env;
use std::sync::Arc;

use kubernetriks_rl_scheduler::config::ReplayConfig;
use kubernetriks_rl_scheduler::core::cluster_client::simulated::SimulatedClusterClient;
use kubernetriks_rl_scheduler::core::scheduler::context::CycleContext;
use kubernetriks_rl_scheduler::core::scheduler::kube_scheduler::{
    default_kube_scheduler_config, KubeScheduler,
};

#[derive(Parser)]
struct Args {
    #[clap(short, long)]
    config_file: std::path::PathBuf,
    /// Scorer endpoint, overrides plugin args and RL_SCHEDULER_ENDPOINT
    #[clap(short, long)]
    endpoint: Option<String>,
}

fn main() {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    env_logger_builder.init();

    let args = Args::parse();

    info!("Path to config file: {:?}", args.config_file);

    let config_yaml =
        std::fs::read_to_string(&args.config_file).expect("could not read config file");
    let config =
        serde_yaml::from_str::<ReplayConfig>(&config_yaml).expect("could not parse config file");

    let mut plugin_args = config.plugin_args.clone();
    if let Some(endpoint) = args.endpoint {
        if !plugin_args.is_mapping() {
            plugin_args = serde_yaml::Value::Mapping(Default::default());
        }
        plugin_args["endpoint"] = serde_yaml::Value::String(endpoint);
    }

    let cluster = Arc::new(SimulatedClusterClient::new());
    for node in config.nodes.iter() {
        cluster.add_node(node.clone());
    }
    for pod in config.pods.iter() {
        cluster.add_pod(pod.clone());
    }
    info!(
        "Replaying {} pods on {} nodes",
        cluster.pod_count(),
        cluster.node_count()
    );

    let scheduler = KubeScheduler::new(default_kube_scheduler_config(plugin_args), cluster.clone())
        .expect("could not create scheduler");

    let nodes = cluster.list_nodes();
    let mut scheduled = 0;
    for pod in cluster.pending_pods() {
        let ctx = match config.cycle_timeout() {
            Some(timeout) => CycleContext::background().with_timeout(timeout),
            None => CycleContext::background(),
        };
        match scheduler.schedule_one(&ctx, &pod, &nodes) {
            Ok(node_name) => {
                scheduled += 1;
                info!("Pod {:?} scheduled to node {:?}", pod.metadata.key(), node_name);
            }
            Err(err) => error!("Failed to schedule pod {:?}: {}", pod.metadata.key(), err),
        }
    }

    info!(
        "Scheduled {} of {} pods, {} still pending",
        scheduled,
        cluster.pod_count(),
        cluster.pending_pods().len()
    );
}
