use std::collections::BTreeSet;
use std::time::Duration;

use cgscope_core::graph::{CallGraph, ProjectPrefixes};
use cgscope_core::loader::CgResult;
use cgscope_core::model::{Function, FunctionId, Ider};
use cgscope_core::overlap::{NodeResult, SystemOverlap, ALL_MICROS};
use cgscope_core::profile::{OutConfig, OutType};
use cgscope_core::recommend::{
    apply, apply_all, greedy_additional, rec_bench_key, write_all, GreedyAdditional,
    RecommendError, RecommendationStrategy, RecommendedFunction, RECOMMENDATION_HEADER,
};

const PROJECT: &str = "project/";

const SUBGRAPH_1: &[(usize, usize)] =
    &[(0, 1), (0, 2), (1, 2), (1, 3), (1, 4), (2, 4), (2, 5), (3, 1), (3, 6), (4, 5), (5, 2)];
const SUBGRAPH_2: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (1, 3),
    (1, 4),
    (2, 4),
    (2, 5),
    (2, 6),
    (3, 7),
    (4, 8),
    (5, 9),
    (6, 9),
    (7, 10),
    (7, 11),
    (9, 6),
];

fn config() -> OutConfig {
    OutConfig { out_type: OutType::Dot, node_count: 100, node_fraction: 0.005, edge_fraction: 0.001 }
}

fn project_nodes(subgraph: usize) -> &'static [usize] {
    match subgraph {
        1 => &[2, 3, 4, 5, 6],
        _ => &[2, 3, 5, 6, 7],
    }
}

fn node_name(subgraph: usize, nr: usize, with_projects: bool) -> String {
    let project = with_projects && project_nodes(subgraph).contains(&nr);
    format!("{}f{subgraph}_{nr}", if project { PROJECT } else { "" })
}

fn add_subgraph(
    cg: &mut CallGraph,
    ider: &Ider,
    subgraph: usize,
    count: usize,
    edges: &[(usize, usize)],
    with_projects: bool,
) {
    let ids: Vec<FunctionId> = (0..count)
        .map(|nr| {
            let f = Function::new(ider, &node_name(subgraph, nr, with_projects))
                .with_times(Duration::from_millis(nr as u64), Duration::from_millis(10));
            let id = f.id;
            cg.add_function(f);
            id
        })
        .collect();
    for (from, to) in edges {
        cg.add_call(ids[*from], ids[*to], Duration::from_micros(1)).unwrap();
    }
}

/// Subgraph 1 (7 functions), optionally subgraph 2 (12 functions) and an
/// edge from `project/f1_5` to `project/f2_2`.
fn system(two_roots: bool, connected: bool, with_projects: bool) -> CgResult {
    let ider = Ider::new();
    let mut cg = CallGraph::new();
    add_subgraph(&mut cg, &ider, 1, 7, SUBGRAPH_1, with_projects);
    if two_roots {
        add_subgraph(&mut cg, &ider, 2, 12, SUBGRAPH_2, with_projects);
    }
    if connected {
        let from = ider.lookup(&format!("{PROJECT}f1_5")).unwrap();
        let to = ider.lookup(&format!("{PROJECT}f2_2")).unwrap();
        cg.add_call(from, to, Duration::from_micros(1)).unwrap();
    }
    CgResult::new(config(), "system1", cg, ider)
}

fn overlaps(cg_res: &CgResult, covered: &[&str]) -> SystemOverlap {
    let mut total = NodeResult::new("system1", ALL_MICROS);
    for name in covered {
        if let Some(id) = cg_res.ider.lookup(name) {
            total.overlapping_nodes.insert(id, 1);
        }
    }
    SystemOverlap { name: "system1".to_string(), micros: Default::default(), total }
}

fn default_overlaps(cg_res: &CgResult) -> SystemOverlap {
    overlaps(cg_res, &["project/f1_3", "project/f1_6"])
}

fn summary(recs: &[RecommendedFunction]) -> Vec<(String, usize)> {
    recs.iter().map(|r| (r.function.name.clone(), r.additional_nodes)).collect()
}

fn projects() -> ProjectPrefixes {
    ProjectPrefixes::parse(PROJECT)
}

#[test]
fn empty_system_graph_recommends_nothing() {
    let cg_res = CgResult::new(config(), "system1", CallGraph::new(), Ider::new());
    let ovl = overlaps(&cg_res, &[]);
    assert!(greedy_additional(&projects(), &cg_res, &ovl, 10).is_empty());
}

#[test]
fn no_project_functions_recommends_nothing() {
    let cg_res = system(true, false, false);
    let ovl = default_overlaps(&cg_res);
    assert!(greedy_additional(&projects(), &cg_res, &ovl, 10).is_empty());
}

#[test]
fn single_subgraph_yields_one_function() {
    let cg_res = system(false, false, true);
    let recs = greedy_additional(&projects(), &cg_res, &default_overlaps(&cg_res), 3);
    assert_eq!(summary(&recs), vec![("project/f1_2".to_string(), 3)]);
}

#[test]
fn disconnected_subgraphs_yield_three_functions() {
    let cg_res = system(true, false, true);
    let recs = greedy_additional(&projects(), &cg_res, &default_overlaps(&cg_res), 3);
    assert_eq!(
        summary(&recs),
        vec![
            ("project/f1_2".to_string(), 3),
            ("project/f2_2".to_string(), 3),
            ("project/f2_3".to_string(), 2),
        ]
    );
}

#[test]
fn connected_subgraphs_share_reachability() {
    let cg_res = system(true, true, true);
    let recs = greedy_additional(&projects(), &cg_res, &default_overlaps(&cg_res), 3);
    assert_eq!(
        summary(&recs),
        vec![("project/f1_2".to_string(), 6), ("project/f2_3".to_string(), 2)]
    );
}

#[test]
fn without_overlap_the_widest_reach_wins() {
    let cg_res = system(true, false, true);
    let recs = greedy_additional(&projects(), &cg_res, &overlaps(&cg_res, &[]), 3);
    assert_eq!(
        summary(&recs),
        vec![
            ("project/f1_3".to_string(), 5),
            ("project/f2_2".to_string(), 3),
            ("project/f2_3".to_string(), 2),
        ]
    );
}

#[test]
fn count_limits_the_result() {
    let cg_res = system(true, false, true);
    let recs = greedy_additional(&projects(), &cg_res, &default_overlaps(&cg_res), 1);
    assert_eq!(recs.len(), 1);
    assert!(greedy_additional(&projects(), &cg_res, &default_overlaps(&cg_res), 0).is_empty());
}

/// System graph rooted at `main` with the given calls.
fn flat_system(calls: &[(&str, &str)]) -> CgResult {
    let ider = Ider::new();
    let mut cg = CallGraph::new();
    for (from, to) in calls {
        for name in [from, to] {
            if ider.lookup(name).is_none() {
                cg.add_function(Function::new(&ider, name));
            }
        }
        let (from, to) = (ider.lookup(from).unwrap(), ider.lookup(to).unwrap());
        cg.add_call(from, to, Duration::from_micros(1)).unwrap();
    }
    CgResult::new(config(), "system1", cg, ider)
}

#[test]
fn ties_on_reach_and_level_prefer_more_non_project_functions() {
    let cg_res = flat_system(&[
        ("main", "project/a"),
        ("main", "project/b"),
        ("project/a", "lib/z"),
        ("project/b", "lib/x"),
        ("project/b", "lib/y"),
    ]);
    let ovl = overlaps(&cg_res, &[]);

    let recs = greedy_additional(&projects(), &cg_res, &ovl, 1);
    assert_eq!(summary(&recs), vec![("project/b".to_string(), 1)]);
}

#[test]
fn full_ties_are_broken_by_name() {
    let cg_res = flat_system(&[
        ("main", "project/b"),
        ("main", "project/a"),
        ("project/b", "lib/x"),
        ("project/a", "lib/y"),
    ]);
    let ovl = overlaps(&cg_res, &[]);

    let recs = greedy_additional(&projects(), &cg_res, &ovl, 2);
    assert_eq!(
        summary(&recs),
        vec![("project/a".to_string(), 1), ("project/b".to_string(), 1)]
    );
}

#[test]
fn recommendations_are_uncovered_project_functions() {
    let cg_res = system(true, true, true);
    let ovl = default_overlaps(&cg_res);
    let recs = greedy_additional(&projects(), &cg_res, &ovl, 10);

    let mut seen = BTreeSet::new();
    for rec in &recs {
        assert!(rec.function.name.starts_with(PROJECT));
        assert!(!ovl.total.overlapping_nodes.contains_key(&rec.function.id));
        assert!(seen.insert(rec.function.id));
        assert!(rec.additional_nodes > 0);
    }
}

#[test]
fn apply_adds_one_micro_per_recommendation() {
    let cg_res = system(true, false, true);
    let ovl = default_overlaps(&cg_res);

    let res = apply(&projects(), &cg_res, &ovl, &GreedyAdditional, 3);
    assert_eq!(res.requested, 3);
    assert_eq!(res.recommended.len(), 3);
    assert_eq!(res.cg.micro_cgs.len(), 3);
    assert!(cg_res.micro_cgs.is_empty());

    let first = &res.recommended[0].function;
    let key = rec_bench_key(&cg_res, first);
    assert_eq!(
        key,
        format!("rec-bench_{}_project/f1_2__100__0_00500__0_00100.dot", first.id)
    );

    // project/f1_2 reaches f1_2, f1_4 and f1_5.
    let micro = &res.cg.micro_cgs[&key];
    assert_eq!(micro.function_count(), 3);
    assert_eq!(micro.call_count(), 4);
    assert_eq!(micro.function(first.id), Some(first));
}

#[test]
fn apply_accepts_closures() {
    let cg_res = system(true, false, true);
    let ovl = default_overlaps(&cg_res);
    let fixed = |_: &ProjectPrefixes, res: &CgResult, _: &SystemOverlap, count: usize| {
        res.system_cg
            .functions()
            .filter(|f| f.name == "project/f2_3")
            .take(count)
            .map(|f| RecommendedFunction { function: f.clone(), additional_nodes: 1 })
            .collect::<Vec<_>>()
    };

    let res = apply(&projects(), &cg_res, &ovl, &fixed, 2);
    assert_eq!(res.recommended.len(), 1);
    assert_eq!(res.requested, 2);
    let micro = res.cg.micro_cgs.values().next().unwrap();
    assert_eq!(micro.function_count(), 4);
}

#[test]
fn strategy_trait_and_function_agree() {
    let cg_res = system(true, true, true);
    let ovl = default_overlaps(&cg_res);
    assert_eq!(
        GreedyAdditional.recommend(&projects(), &cg_res, &ovl, 3),
        greedy_additional(&projects(), &cg_res, &ovl, 3)
    );
}

#[test]
fn apply_all_requires_matching_lengths() {
    let cg_res = system(true, false, true);
    let err = apply_all(&projects(), &[cg_res], &[], &GreedyAdditional, 3).unwrap_err();
    assert_eq!(err, RecommendError::LengthMismatch { results: 1, overlaps: 0 });
}

#[test]
fn writes_header_and_one_row_per_recommendation() {
    let cg_res = system(true, false, true);
    let ovl = default_overlaps(&cg_res);
    let results = apply_all(&projects(), &[cg_res], &[ovl], &GreedyAdditional, 5).unwrap();

    let mut out = Vec::new();
    write_all(&projects(), &results, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], RECOMMENDATION_HEADER.join(";"));
    assert_eq!(lines[1], "project/;system1;100;0.00500;5;3;project/f1_2;2000000;10000000;3");
}

#[test]
fn empty_results_still_write_the_header() {
    let mut out = Vec::new();
    write_all(&projects(), &[], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
}
