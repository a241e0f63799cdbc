use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use splice_ports::{
	FeatherRenamePlan, FeatherRenameRequest, FeatherSkipReason, GlobalVarRewriteAssessment, LoopHoistRequest,
	PortResult, ProjectAnalysisPort,
};
use splice_primitives::{ConflictKind, WorkspaceEdit};

use super::*;
use crate::test_support::{InMemoryProject, count, id};
use crate::{RefactorConfig, RefactorError};

const MOVE: &str = "function scr_move(spd) {\n\treturn spd * 2;\n}\n";
const PLAYER: &str = "x += scr_move(4); // scr_move doubles\ny += scr_move(1);\n";
const JUMP: &str = "function scr_jump() {\n\tscr_move(0);\n}\n";

fn movement() -> InMemoryProject {
	InMemoryProject::new()
		.file("scripts/scr_move.gml", MOVE)
		.file("objects/obj_player.gml", PLAYER)
		.symbol("gml/script/scr_move", "scripts/scr_move.gml")
}

fn with_dependent() -> InMemoryProject {
	movement()
		.file("scripts/scr_jump.gml", JUMP)
		.symbol("gml/script/scr_jump", "scripts/scr_jump.gml")
		.dependency("gml/script/scr_move", "gml/script/scr_jump")
}

fn chain() -> InMemoryProject {
	InMemoryProject::new()
		.file("scripts/a.gml", "function scr_a() {\n\treturn scr_b();\n}\n")
		.file("scripts/b.gml", "function scr_b() {\n\treturn 1;\n}\n")
		.symbol("gml/script/scr_a", "scripts/a.gml")
		.symbol("gml/script/scr_b", "scripts/b.gml")
}

fn engine(project: &Arc<InMemoryProject>) -> RenameEngine {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	RenameEngine::builder()
		.semantic(project.clone())
		.files(project.clone())
		.parser(project.clone())
		.transpiler(project.clone())
		.build()
}

fn walk() -> RenameRequest {
	RenameRequest::new("gml/script/scr_move", "scr_walk")
}

#[tokio::test]
async fn rename_applies_every_occurrence_and_verifies() {
	let project = Arc::new(movement());
	let options = RenameOptions {
		verify_integrity: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).rename_symbol(&walk(), options).await.unwrap();

	assert!(outcome.applied);
	assert_eq!(outcome.plan.occurrence_count, 3);
	assert_eq!(outcome.plan.workspace_edit.len(), 3);
	assert_eq!(outcome.plan.definition_path.as_deref(), Some(Path::new("scripts/scr_move.gml")));
	assert_eq!(
		project.text("objects/obj_player.gml").unwrap(),
		"x += scr_walk(4); // scr_move doubles\ny += scr_walk(1);\n"
	);
	assert_eq!(
		project.text("scripts/scr_move.gml").unwrap(),
		"function scr_walk(spd) {\n\treturn spd * 2;\n}\n"
	);
	assert_eq!(count(&project.calls.writes), 2);

	let integrity = outcome.integrity.unwrap();
	assert!(integrity.is_valid());
	assert_eq!(
		integrity.warnings,
		vec!["'scr_move' still appears in comments or strings in objects/obj_player.gml"]
	);
}

#[tokio::test]
async fn dry_run_renders_without_writing() {
	let project = Arc::new(movement());
	let options = RenameOptions {
		dry_run: true,
		verify_integrity: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).rename_symbol(&walk(), options).await.unwrap();

	assert!(!outcome.applied);
	assert_eq!(count(&project.calls.writes), 0);
	assert_eq!(project.text("objects/obj_player.gml").unwrap(), PLAYER);
	assert_eq!(
		outcome.files[Path::new("objects/obj_player.gml")],
		"x += scr_walk(4); // scr_move doubles\ny += scr_walk(1);\n"
	);
	assert!(outcome.integrity.unwrap().is_valid());
}

#[tokio::test]
async fn conflicting_rename_reads_nothing() {
	let project = Arc::new(movement().bind(None, "scr_walk", Some("gml/script/scr_other")));
	let outcome = engine(&project)
		.rename_symbol(&walk(), RenameOptions::default())
		.await
		.unwrap();

	assert!(!outcome.plan.valid);
	assert!(!outcome.applied);
	assert!(outcome.plan.workspace_edit.is_empty());
	assert_eq!(count(&project.calls.reads), 0);

	let json = serde_json::to_value(&outcome.plan).unwrap();
	assert_eq!(json["conflicts"][0]["type"], "shadow");
	assert_eq!(json["valid"], false);
}

#[tokio::test]
async fn shadowing_is_reported_for_the_scope_it_occurs_in() {
	let project = Arc::new(
		movement()
			.scoped("objects/obj_player.gml", "obj_player")
			.bind(Some("obj_player"), "scr_walk", Some("gml/var/obj_player::scr_walk")),
	);
	let plan = engine(&project).plan_rename(&walk()).await.unwrap();

	assert_eq!(plan.conflicts.len(), 1);
	assert_eq!(plan.conflicts[0].path.as_deref(), Some(Path::new("objects/obj_player.gml")));
	assert_eq!(
		plan.errors,
		vec!["'scr_walk' already refers to another symbol in scope 'obj_player'"]
	);
	assert_eq!(count(&project.calls.lookup), 2);
}

#[tokio::test]
async fn missing_symbol_stops_before_occurrences() {
	let project = Arc::new(movement());
	let plan = engine(&project)
		.plan_rename(&RenameRequest::new("gml/script/scr_gone", "scr_here"))
		.await
		.unwrap();

	assert!(!plan.valid);
	assert_eq!(plan.conflicts[0].kind, ConflictKind::MissingSymbol);
	assert_eq!(plan.errors, vec!["Symbol gml/script/scr_gone does not exist"]);
	assert_eq!(count(&project.calls.occurrences), 0);
}

#[tokio::test]
async fn occurrence_failure_is_an_analysis_error() {
	let project = Arc::new(movement().failing("symbol_occurrences"));
	let plan = engine(&project).plan_rename(&walk()).await.unwrap();
	assert!(!plan.valid);
	assert_eq!(plan.conflicts[0].kind, ConflictKind::AnalysisError);
	assert_eq!(count(&project.calls.lookup), 0);
}

#[tokio::test]
async fn malformed_input_raises_for_plans_but_not_validation() {
	let project = Arc::new(movement());
	let engine = engine(&project);
	let bad = RenameRequest::new("gml/sprite/spr_player", "spr_hero");

	assert!(matches!(
		engine.plan_rename(&bad).await,
		Err(RefactorError::MalformedSymbolId(_))
	));
	assert!(matches!(
		engine.rename_symbol(&RenameRequest::new("gml/script/scr_move", "2fast"), RenameOptions::default()).await,
		Err(RefactorError::InvalidIdentifier { .. })
	));

	let validation = engine.validate_rename_request(&bad).await.unwrap();
	assert!(!validation.valid);
	assert_eq!(validation.errors.len(), 1);
	assert_eq!(count(&project.calls.has_symbol), 0);
}

#[tokio::test]
async fn without_analyzer_existence_is_assumed_but_nothing_is_planned() {
	let project = Arc::new(movement());
	let engine = RenameEngine::builder().files(project.clone()).build();
	let plan = engine.plan_rename(&walk()).await.unwrap();

	assert!(!plan.valid);
	assert_eq!(plan.errors, vec!["No changes to apply"]);
	assert!(plan.warnings[0].starts_with("No semantic analyzer available; assuming gml/script/scr_move exists"));
}

#[tokio::test]
async fn repeated_validation_is_cached_until_invalidated() {
	let project = Arc::new(movement());
	let engine = engine(&project);

	let first = engine.validate_rename_request(&walk()).await.unwrap();
	let second = engine.validate_rename_request(&walk()).await.unwrap();
	assert!(first.valid);
	assert_eq!(first.occurrence_count, 3);
	assert_eq!(first, second);
	assert_eq!(count(&project.calls.lookup), 1);
	assert_eq!(engine.cache_stats().validation.hits, 1);

	engine.invalidate_symbol(&id("gml/script/scr_move"));
	engine.validate_rename_request(&walk()).await.unwrap();
	assert_eq!(count(&project.calls.lookup), 2);

	engine.clear_caches();
	assert_eq!(engine.cache_stats().validation.size, 0);
	assert_eq!(engine.cache_stats().query.size, 0);
}

#[tokio::test]
async fn validation_after_a_failed_read_is_recomputed() {
	let project = Arc::new(movement().failing("symbol_occurrences"));
	let engine = engine(&project);

	let first = engine.validate_rename_request(&walk()).await.unwrap();
	assert!(!first.valid);
	assert!(first.conflicts.iter().any(|c| c.kind == ConflictKind::AnalysisError));
	assert_eq!(engine.cache_stats().validation.size, 0);

	project.recover("symbol_occurrences");
	let second = engine.validate_rename_request(&walk()).await.unwrap();
	assert!(second.valid, "{:?}", second.errors);
	assert_eq!(second.occurrence_count, 3);
	assert_eq!(count(&project.calls.occurrences), 2);

	engine.validate_rename_request(&walk()).await.unwrap();
	assert_eq!(count(&project.calls.occurrences), 2);
	assert_eq!(engine.cache_stats().validation.hits, 1);
}

#[tokio::test]
async fn concurrent_validations_share_one_analysis() {
	let project = Arc::new(movement());
	let engine = engine(&project);
	let request = walk();

	let (a, b) = tokio::join!(
		engine.validate_rename_request(&request),
		engine.validate_rename_request(&request)
	);
	assert_eq!(a.unwrap(), b.unwrap());
	assert_eq!(count(&project.calls.lookup), 1);
}

#[tokio::test]
async fn edit_threshold_comes_from_config() {
	let project = Arc::new(movement());
	let engine = RenameEngine::builder()
		.config(RefactorConfig::from_toml_str("large_edit_threshold = 2\n").unwrap())
		.semantic(project.clone())
		.build();
	let plan = engine.plan_rename(&walk()).await.unwrap();

	assert!(plan.valid);
	assert_eq!(plan.warnings, vec!["Large number of edits planned (3 edits across 2 files)"]);
}

#[tokio::test]
async fn impact_lists_files_counts_and_dependents() {
	let project = (0..11).fold(movement(), |p, i| {
		p.dependency("gml/script/scr_move", &format!("gml/script/dep_{i}"))
	});
	let project = Arc::new(project);
	let impact = engine(&project).analyze_rename_impact(&walk()).await.unwrap();

	assert!(impact.valid);
	assert_eq!(
		impact.affected_files,
		vec![PathBuf::from("objects/obj_player.gml"), PathBuf::from("scripts/scr_move.gml")]
	);
	assert_eq!(impact.total_occurrences, 3);
	assert_eq!(impact.definitions, 1);
	assert_eq!(impact.references, 2);
	assert_eq!(impact.dependents.len(), 11);
	assert!(impact.conflicts.iter().any(|c| c.kind == ConflictKind::ManyDependents && !c.is_error()));
	assert!(impact.warnings.iter().any(|w| w.contains("11 direct dependents")));
}

#[tokio::test]
async fn hot_reload_report_patches_renamed_script_and_dependents() {
	let project = Arc::new(with_dependent());
	let options = RenameOptions {
		dry_run: true,
		validate_hot_reload: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).rename_symbol(&walk(), options).await.unwrap();
	let report = outcome.hot_reload.unwrap();

	assert!(report.safety.safe);
	assert_eq!(
		report.cascade.unwrap().order,
		vec![id("gml/script/scr_move"), id("gml/script/scr_jump")]
	);
	assert_eq!(report.patches.len(), 2);
	assert_eq!(report.patches[0].symbol_id, id("gml/script/scr_walk"));
	assert_eq!(
		report.patches[0].body,
		"// patch gml/script/scr_walk\nfunction scr_walk(spd) {\n\treturn spd * 2;\n}\n"
	);
	assert_eq!(
		report.patches[1].body,
		"// patch gml/script/scr_jump\nfunction scr_jump() {\n\tscr_walk(0);\n}\n"
	);
}

#[tokio::test]
async fn failed_transpile_is_omitted() {
	let project = Arc::new(with_dependent().failing_transpile("gml/script/scr_jump"));
	let options = RenameOptions {
		dry_run: true,
		validate_hot_reload: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).rename_symbol(&walk(), options).await.unwrap();
	let patches = outcome.hot_reload.unwrap().patches;
	assert_eq!(patches.len(), 1);
	assert_eq!(patches[0].symbol_id, id("gml/script/scr_walk"));
	assert_eq!(count(&project.calls.transpiles), 2);
}

#[tokio::test]
async fn failed_cascade_still_patches_the_renamed_script() {
	let project = Arc::new(with_dependent().failing("dependents"));
	let options = RenameOptions {
		dry_run: true,
		validate_hot_reload: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).rename_symbol(&walk(), options).await.unwrap();
	let report = outcome.hot_reload.unwrap();
	assert!(report.cascade.is_none());
	assert_eq!(report.patches.len(), 1);
}

#[tokio::test]
async fn generating_patches_requires_a_transpiler() {
	let project = Arc::new(movement());
	let engine = RenameEngine::builder().files(project.clone()).build();
	let err = engine
		.generate_transpiler_patches(&[], &Default::default())
		.await
		.unwrap_err();
	assert_eq!(err, RefactorError::ProviderRequired("generate_transpiler_patches"));
}

#[tokio::test]
async fn patch_source_falls_back_to_the_file_port() {
	let project = Arc::new(with_dependent());
	let target = PatchTarget {
		symbol_id: id("gml/script/scr_jump"),
		path: PathBuf::from("scripts/scr_jump.gml"),
	};
	let patches = engine(&project)
		.generate_transpiler_patches(&[target], &Default::default())
		.await
		.unwrap();
	assert_eq!(patches[0].body, format!("// patch gml/script/scr_jump\n{JUMP}"));
	assert_eq!(count(&project.calls.reads), 1);
}

#[tokio::test]
async fn macro_renames_need_recompilation() {
	let project = Arc::new(
		InMemoryProject::new()
			.file("scripts/macros.gml", "#macro MAX_HP 100\nhp = MAX_HP;\n")
			.symbol("gml/macro/MAX_HP", "scripts/macros.gml"),
	);
	let safety = engine(&project)
		.check_hot_reload_safety(&RenameRequest::new("gml/macro/MAX_HP", "HP_CAP"))
		.await;
	assert!(!safety.safe);
	assert!(!safety.requires_restart);
	assert!(safety.can_auto_fix);
}

#[tokio::test]
async fn script_renames_are_safe_and_shadowing_is_fixable() {
	let project = Arc::new(movement());
	let safety = engine(&project).check_hot_reload_safety(&walk()).await;
	assert!(safety.safe && !safety.requires_restart);

	let project = Arc::new(movement().bind(None, "scr_walk", Some("gml/script/scr_other")));
	let safety = engine(&project).check_hot_reload_safety(&walk()).await;
	assert!(!safety.safe && !safety.requires_restart && safety.can_auto_fix);
	assert!(safety.reason.contains("shadow"));
}

#[tokio::test]
async fn unverifiable_safety_fails_closed() {
	let project = Arc::new(movement());
	let cases = [
		(
			RenameEngine::builder().files(project.clone()).build(),
			walk(),
		),
		(engine(&project), RenameRequest::new("gml/sprite/spr", "x")),
		(engine(&project), RenameRequest::new("gml/script/scr_move", "repeat")),
		(engine(&project), RenameRequest::new("gml/script/scr_gone", "scr_here")),
	];
	for (engine, request) in cases {
		let safety = engine.check_hot_reload_safety(&request).await;
		assert!(
			!safety.safe && safety.requires_restart && !safety.can_auto_fix,
			"{request:?}"
		);
	}
}

#[tokio::test]
async fn engine_exposes_cascade_and_impact_graph() {
	let project = Arc::new(with_dependent());
	let renamer = engine(&project);
	let cascade = renamer
		.compute_hot_reload_cascade(&[id("gml/script/scr_move")])
		.await
		.unwrap();
	assert_eq!(cascade.metadata.total_symbols, 2);
	assert_eq!(cascade.cascade[1].path.as_deref(), Some(Path::new("scripts/scr_jump.gml")));

	let graph = renamer
		.compute_rename_impact_graph(&id("gml/script/scr_move"))
		.await
		.unwrap();
	assert_eq!(graph.total_affected, 1);

	let failing = engine(&Arc::new(with_dependent().failing("dependents")));
	assert!(matches!(
		failing.compute_hot_reload_cascade(&[id("gml/script/scr_move")]).await,
		Err(RefactorError::Port(_))
	));
}

#[tokio::test]
async fn batch_chain_renames_apply_atomically() {
	let project = Arc::new(chain());
	let requests = [
		RenameRequest::new("gml/script/scr_a", "scr_b"),
		RenameRequest::new("gml/script/scr_b", "scr_c"),
	];
	let options = RenameOptions {
		verify_integrity: true,
		..RenameOptions::default()
	};
	let outcome = engine(&project).execute_batch_rename(&requests, options).await.unwrap();

	assert!(outcome.validation.valid, "{:?}", outcome.validation.errors);
	assert!(outcome.applied);
	assert_eq!(outcome.workspace_edit.len(), 3);
	assert_eq!(
		project.text("scripts/a.gml").unwrap(),
		"function scr_b() {\n\treturn scr_c();\n}\n"
	);
	assert_eq!(project.text("scripts/b.gml").unwrap(), "function scr_c() {\n\treturn 1;\n}\n");

	let integrity = outcome.integrity.unwrap();
	assert!(integrity.is_valid(), "{:?}", integrity.errors);
}

#[tokio::test]
async fn circular_batch_is_rejected_before_any_port_call() {
	let project = Arc::new(chain());
	let requests = [
		RenameRequest::new("gml/script/scr_a", "scr_b"),
		RenameRequest::new("gml/script/scr_b", "scr_a"),
	];
	let engine = engine(&project);

	let validation = engine.validate_batch_rename(&requests).await;
	assert!(!validation.valid);
	assert_eq!(validation.errors, vec!["Circular rename chain: scr_a -> scr_b -> scr_a"]);

	let outcome = engine
		.execute_batch_rename(&requests, RenameOptions::default())
		.await
		.unwrap();
	assert!(!outcome.applied);
	assert_eq!(count(&project.calls.has_symbol), 0);
	assert_eq!(count(&project.calls.reads), 0);
}

#[tokio::test]
async fn batch_conflict_blocks_every_request() {
	let project = Arc::new(chain().bind(None, "scr_z", Some("gml/script/scr_other")));
	let requests = [
		RenameRequest::new("gml/script/scr_a", "scr_z"),
		RenameRequest::new("gml/script/scr_b", "scr_c"),
	];
	let outcome = engine(&project)
		.execute_batch_rename(&requests, RenameOptions::default())
		.await
		.unwrap();

	assert!(!outcome.applied);
	assert!(outcome.validation.errors[0].starts_with("gml/script/scr_a: "));
	assert_eq!(outcome.plans.len(), 2);
	assert!(outcome.plans[1].valid);
	assert_eq!(count(&project.calls.reads), 0);
}

#[tokio::test]
async fn batch_edits_colliding_across_requests_are_rejected() {
	let project = Arc::new(
		InMemoryProject::new()
			.file("objects/o.gml", "hp = 1;\n")
			.symbol("gml/var/obj_a::hp", "objects/o.gml")
			.symbol("gml/var/obj_b::hp", "objects/o.gml"),
	);
	let requests = [
		RenameRequest::new("gml/var/obj_a::hp", "health"),
		RenameRequest::new("gml/var/obj_b::hp", "vitality"),
	];
	let outcome = engine(&project)
		.execute_batch_rename(&requests, RenameOptions::default())
		.await
		.unwrap();

	assert!(outcome.plans.iter().all(|plan| plan.valid));
	assert!(!outcome.validation.valid);
	assert!(!outcome.applied);
	assert_eq!(
		outcome.validation.errors,
		vec!["Overlapping edits in objects/o.gml: [0, 2) vs [0, 2)"]
	);
	assert_eq!(count(&project.calls.writes), 0);
	assert_eq!(project.text("objects/o.gml").unwrap(), "hp = 1;\n");
}

#[tokio::test]
async fn malformed_batch_requests() {
	let project = Arc::new(chain());
	let engine = engine(&project);
	let requests = [
		RenameRequest::new("gml/script/scr_a", "scr_x"),
		RenameRequest::new("", "scr_y"),
	];

	let validation = engine.validate_batch_rename(&requests).await;
	assert!(!validation.valid);
	assert!(validation.errors[0].starts_with("Request 1 ():"));

	assert!(matches!(
		engine.execute_batch_rename(&requests, RenameOptions::default()).await,
		Err(RefactorError::InvalidInput { field: "symbol_id", .. })
	));
	assert!(!engine.validate_batch_rename(&[]).await.valid);
}

#[tokio::test]
async fn apply_requires_a_file_port_and_a_valid_edit() {
	let mut edit = WorkspaceEdit::new();
	edit.add_edit("objects/obj_player.gml", 0, 10, "a");
	assert_eq!(
		RenameEngine::builder().build().apply_workspace_edit(&edit, false).await,
		Err(RefactorError::ProviderRequired("apply_workspace_edit"))
	);

	let project = Arc::new(movement());
	let engine = engine(&project);
	edit.add_edit("objects/obj_player.gml", 5, 15, "b");
	assert!(matches!(
		engine.apply_workspace_edit(&edit, false).await,
		Err(RefactorError::InvalidInput { field: "workspace_edit", .. })
	));
	assert_eq!(count(&project.calls.reads), 0);

	let mut out_of_bounds = WorkspaceEdit::new();
	out_of_bounds.add_edit("objects/obj_player.gml", 0, 999, "x");
	match engine.apply_workspace_edit(&out_of_bounds, true).await {
		Err(RefactorError::Apply { path, .. }) => assert_eq!(path, "objects/obj_player.gml"),
		other => panic!("expected apply error, got {other:?}"),
	}
}

#[tokio::test]
async fn write_failure_propagates() {
	let project = Arc::new(movement().failing("write_file"));
	let result = engine(&project).rename_symbol(&walk(), RenameOptions::default()).await;
	assert!(matches!(result, Err(RefactorError::Port(_))));
}

#[tokio::test]
async fn verification_flags_leftovers_and_parse_failures() {
	let project = Arc::new(InMemoryProject::new().file("scripts/a.gml", "function scr_walk() {\n\tscr_move();\n"));
	let report = engine(&project)
		.verify_post_edit_integrity(&walk(), &[PathBuf::from("scripts/a.gml")])
		.await
		.unwrap();
	assert_eq!(
		report.errors,
		vec![
			"'scr_move' still appears 1 time(s) in code in scripts/a.gml",
			"scripts/a.gml no longer parses: failed to parse scripts/a.gml: unbalanced braces",
		]
	);
}

#[tokio::test]
async fn verification_warns_about_collisions_and_missing_files() {
	let project = Arc::new(
		InMemoryProject::new()
			.file("scripts/hp.gml", "points = 1;\n")
			.symbol("gml/script/points", "scripts/points.gml"),
	);
	let engine = engine(&project);
	let report = engine
		.verify_post_edit_integrity(&RenameRequest::new("gml/var/hp", "points"), &[PathBuf::from("scripts/hp.gml")])
		.await
		.unwrap();
	assert!(report.is_valid());
	assert_eq!(report.warnings, vec!["'points' may collide with existing symbol gml/script/points"]);

	let report = engine
		.verify_post_edit_integrity(&walk(), &[PathBuf::from("missing.gml")])
		.await
		.unwrap();
	assert_eq!(report.errors.len(), 1);
	assert!(report.errors[0].starts_with("Could not read missing.gml"));
	assert_eq!(report.warnings, vec!["'scr_walk' does not appear in code in any edited file"]);
}

#[tokio::test]
async fn invalidating_a_written_file_drops_its_queries() {
	let project = Arc::new(movement());
	let engine = engine(&project);
	engine.validate_rename_request(&walk()).await.unwrap();
	let before = count(&project.calls.occurrences);

	engine.invalidate_file(Path::new("objects/obj_player.gml"));
	engine.validate_rename_request(&walk()).await.unwrap();
	assert_eq!(count(&project.calls.occurrences), before + 1);
}

#[derive(Default)]
struct StubAnalysis {
	forwarded: Mutex<Vec<FeatherRenameRequest>>,
}

#[async_trait]
impl ProjectAnalysisPort for StubAnalysis {
	async fn is_identifier_occupied(&self, name: &str) -> PortResult<bool> {
		Ok(name == "taken")
	}

	async fn identifier_occurrence_files(&self, name: &str) -> PortResult<Vec<PathBuf>> {
		Ok(vec![PathBuf::from(format!("scripts/{name}.gml"))])
	}

	async fn plan_feather_renames(&self, requests: &[FeatherRenameRequest]) -> PortResult<Vec<FeatherRenamePlan>> {
		self.forwarded.lock().extend(requests.iter().cloned());
		Ok(requests
			.iter()
			.map(|r| FeatherRenamePlan {
				identifier_name: r.identifier_name.clone(),
				replacement: Some(r.preferred_replacement.clone()),
				skip_reason: None,
			})
			.collect())
	}

	async fn assess_global_var_rewrite(
		&self,
		_path: Option<&Path>,
		has_initializer: bool,
	) -> PortResult<GlobalVarRewriteAssessment> {
		Ok(GlobalVarRewriteAssessment {
			allow_rewrite: !has_initializer,
			reason: has_initializer.then(|| "declaration has an initializer".to_string()),
		})
	}

	async fn resolve_loop_hoist_identifier(&self, request: &LoopHoistRequest) -> PortResult<Option<String>> {
		Ok(Some(format!("{}_1", request.preferred_name)))
	}
}

#[tokio::test]
async fn project_analysis_requires_a_provider() {
	let engine = RenameEngine::builder().build();
	assert_eq!(
		engine.is_identifier_occupied("x").await,
		Err(RefactorError::ProviderRequired("is_identifier_occupied"))
	);
	assert_eq!(
		engine.plan_feather_renames(&[]).await,
		Err(RefactorError::ProviderRequired("plan_feather_renames"))
	);
	let request = LoopHoistRequest {
		preferred_name: "len".to_string(),
		path: None,
		local_names: Vec::new(),
	};
	assert_eq!(
		engine.resolve_loop_hoist_identifier(&request).await,
		Err(RefactorError::ProviderRequired("resolve_loop_hoist_identifier"))
	);
}

#[tokio::test]
async fn project_analysis_passes_through() {
	let stub = Arc::new(StubAnalysis::default());
	let engine = RenameEngine::builder().project_analysis(stub.clone()).build();

	assert!(engine.is_identifier_occupied("taken").await.unwrap());
	assert_eq!(
		engine.identifier_occurrence_files("hp").await.unwrap(),
		vec![PathBuf::from("scripts/hp.gml")]
	);
	assert!(!engine.assess_global_var_rewrite(None, true).await.unwrap().allow_rewrite);
	let request = LoopHoistRequest {
		preferred_name: "len".to_string(),
		path: None,
		local_names: vec!["len".to_string()],
	};
	assert_eq!(
		engine.resolve_loop_hoist_identifier(&request).await.unwrap().as_deref(),
		Some("len_1")
	);
}

#[tokio::test]
async fn feather_renames_are_screened_before_the_provider() {
	let stub = Arc::new(StubAnalysis::default());
	let engine = RenameEngine::builder().project_analysis(stub.clone()).build();
	let request = |name: &str, replacement: &str| FeatherRenameRequest {
		identifier_name: name.to_string(),
		preferred_replacement: replacement.to_string(),
	};
	let plans = engine
		.plan_feather_renames(&[
			request("a", "1bad"),
			request("b", "repeat"),
			request("c", "c"),
			request("d", "d_renamed"),
		])
		.await
		.unwrap();

	let reasons: Vec<Option<FeatherSkipReason>> = plans.iter().map(|p| p.skip_reason.clone()).collect();
	assert_eq!(
		reasons,
		vec![
			Some(FeatherSkipReason::InvalidIdentifier),
			Some(FeatherSkipReason::Reserved),
			Some(FeatherSkipReason::Unchanged),
			None,
		]
	);
	assert!(plans[3].is_planned());
	assert_eq!(stub.forwarded.lock().len(), 1);
}
