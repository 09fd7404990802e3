mod helpers;

use std::sync::Arc;

use kubernetriks_rl_scheduler::core::cluster_client::simulated::SimulatedClusterClient;
use kubernetriks_rl_scheduler::core::pod::PodPhase;
use kubernetriks_rl_scheduler::core::scheduler::context::CycleContext;
use kubernetriks_rl_scheduler::core::scheduler::kube_scheduler::{
    default_kube_scheduler_config, KubeScheduler, KubeSchedulerConfig, Plugin, Plugins,
    ScheduleError,
};

use helpers::{create_nodes, create_pod, unused_local_url, Reply, TestServer};

fn plugin_args(endpoint: &str) -> serde_yaml::Value {
    serde_yaml::from_str(&format!("endpoint: {}\nrequest_timeout: 5.0", endpoint)).unwrap()
}

fn create_cluster(pods: &[&str], nodes: &[&str]) -> Arc<SimulatedClusterClient> {
    let cluster = Arc::new(SimulatedClusterClient::new());
    for pod in pods {
        cluster.add_pod(create_pod(pod));
    }
    for node in create_nodes(nodes) {
        cluster.add_node(node);
    }
    cluster
}

fn create_scheduler(endpoint: &str, cluster: &Arc<SimulatedClusterClient>) -> KubeScheduler {
    KubeScheduler::new(
        default_kube_scheduler_config(plugin_args(endpoint)),
        cluster.clone(),
    )
    .unwrap()
}

#[test]
fn test_pod_is_bound_to_best_scored_node() {
    let _ = env_logger::try_init();

    let server =
        TestServer::start(|_| Reply::json(r#"{"scores":{"node1": 15, "node2": 73, "node3": 40}}"#));
    let cluster = create_cluster(&["pod_1"], &["node1", "node2", "node3"]);
    let scheduler = create_scheduler(&server.url("/score"), &cluster);
    let pod = cluster.pending_pods().remove(0);

    let node_name = scheduler
        .schedule_one(&CycleContext::background(), &pod, &cluster.list_nodes())
        .unwrap();
    assert_eq!(node_name, "node2");

    let stored = cluster.get_node("node2").unwrap();
    assert_eq!(stored.name(), "node2");
    let bound = cluster
        .list_pods()
        .into_iter()
        .find(|p| p.metadata.name == "pod_1")
        .unwrap();
    assert_eq!(bound.spec.node_name, "node2");
    assert_eq!(bound.status.phase, Some(PodPhase::Running));
    assert!(cluster.pending_pods().is_empty());
    assert_eq!(server.requests().len(), 1);
}

#[test]
fn test_missing_scores_fall_back_to_first_node() {
    // node1 is absent from response and gets minimum score, equal to node2
    let server = TestServer::start(|_| Reply::json(r#"{"scores":{"node2": 0}}"#));
    let cluster = create_cluster(&["pod_1"], &["node1", "node2"]);
    let scheduler = create_scheduler(&server.url("/score"), &cluster);
    let pod = cluster.pending_pods().remove(0);

    assert_eq!(
        scheduler
            .schedule_one(&CycleContext::background(), &pod, &cluster.list_nodes())
            .unwrap(),
        "node1"
    );
}

#[test]
fn test_several_pods_one_request_per_cycle() {
    let server = TestServer::start(|request| {
        // prefer the last candidate node for every pod
        let body = request.json();
        let nodes = body["nodes"].as_array().unwrap();
        let last = nodes[nodes.len() - 1]["metadata"]["name"].as_str().unwrap();
        Reply::json(&format!(r#"{{"scores":{{"{}": 100}}}}"#, last))
    });
    let cluster = create_cluster(&["pod_1", "pod_2", "pod_3"], &["node1", "node2"]);
    let scheduler = create_scheduler(&server.url("/score"), &cluster);
    let nodes = cluster.list_nodes();

    for pod in cluster.pending_pods() {
        assert_eq!(
            scheduler
                .schedule_one(&CycleContext::background(), &pod, &nodes)
                .unwrap(),
            "node2"
        );
    }
    assert_eq!(server.requests().len(), 3);
    assert!(cluster.pending_pods().is_empty());
}

#[test]
fn test_failed_prescore_leaves_pod_pending() {
    let cluster = create_cluster(&["pod_1"], &["node1"]);
    let scheduler = create_scheduler(&unused_local_url("/score"), &cluster);
    let pod = cluster.pending_pods().remove(0);

    assert!(matches!(
        scheduler.schedule_one(&CycleContext::background(), &pod, &cluster.list_nodes()),
        Err(ScheduleError::PreScore(_))
    ));
    assert_eq!(cluster.pending_pods().len(), 1);
}

#[test]
fn test_no_nodes_no_schedule() {
    let cluster = create_cluster(&["pod_1"], &[]);
    let scheduler = create_scheduler(&unused_local_url("/score"), &cluster);
    let pod = cluster.pending_pods().remove(0);

    assert!(matches!(
        scheduler.schedule_one(&CycleContext::background(), &pod, &[]),
        Err(ScheduleError::NoNodes)
    ));
}

#[test]
fn test_unknown_plugin_in_profile() {
    let config = KubeSchedulerConfig {
        scheduler_name: "custom".to_string(),
        plugins: Plugins {
            pre_score: vec![],
            score: vec![Plugin {
                name: "LeastAllocatedResources".to_string(),
                weight: Some(1),
                args: serde_yaml::Value::Null,
            }],
            bind: vec![],
        },
    };
    assert!(matches!(
        KubeScheduler::new(config, Arc::new(SimulatedClusterClient::new())),
        Err(ScheduleError::UnknownPlugin(name)) if name == "LeastAllocatedResources"
    ));
}

#[test]
fn test_invalid_plugin_args() {
    let config = default_kube_scheduler_config(
        serde_yaml::from_str("request_timeout: [1, 2]").unwrap(),
    );
    assert!(matches!(
        KubeScheduler::new(config, Arc::new(SimulatedClusterClient::new())),
        Err(ScheduleError::PluginInit { .. })
    ));
}
