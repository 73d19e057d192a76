use pkgwalk::MetaDB;
use pkgwalk::metadb::package::Kind;
use pkgwalk::metadb::{DefaultConstraintProvider, DependencyVersion};
use pkgwalk::operation::AcceptedTargets;
use pkgwalk::relationship_resolver::*;
use pkgwalk_test_utils::*;

#[test]
fn install_lowest_dependency_first() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", Some("[1.0,)")),
		package("B", "1.0"),
		package("B", "2.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.dependency_version(DependencyVersion::Lowest)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 1.0.0", "Install A 1.0.0"]);
	assert!(plan.is_clean());
}

#[test]
fn install_highest_dependency() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", Some("[1.0,)")),
		package("B", "1.0"),
		package("B", "2.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.dependency_version(DependencyVersion::Highest)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 2.0.0", "Install A 1.0.0"]);
}

#[test]
fn install_satellite_after_runtime() {
	init_logger();
	let source = repository([
		package("A", "1.0"),
		package("A.fr", "1.0").language("fr").depends("A", Some("[1.0]")),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations_for_all(&[get(&source, "A.fr", "1.0"), get(&source, "A", "1.0")])
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install A 1.0.0", "Install A.fr 1.0.0"]);
}

#[test]
fn install_skips_installed_packages() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", None).depends("C", None),
		package("B", "1.0"),
		package("C", "1.0"),
	]);
	let local = repository([package("B", "1.0")]);
	let index = DependentsWalker::new(&local, None).build().unwrap();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install C 1.0.0", "Install A 1.0.0"]);
}

#[test]
fn install_ignore_dependencies() {
	init_logger();
	let source = repository([package("A", "1.0").depends("B", None), package("B", "1.0")]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.ignore_dependencies(true)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install A 1.0.0"]);
}

#[test]
fn install_prefers_listed_from_source() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", Some("1.0")),
		package("B", "1.0").delisted(),
		package("B", "1.1"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 1.1.0", "Install A 1.0.0"]);
}

#[test]
fn install_constraint_limits_choice() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", None),
		package("B", "1.0"),
		package("B", "2.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();
	let mut constraints = DefaultConstraintProvider::new("test");
	constraints.add_constraint("B", range("(,2.0)"));

	let plan = InstallWalker::new(&local, &source, &index, None)
		.constraint_provider(&constraints)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 1.0.0", "Install A 1.0.0"]);
}

#[test]
fn install_missing_dependency_is_fatal() {
	init_logger();
	let source = repository([package("A", "1.0").depends("Missing", None)]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let result = InstallWalker::new(&local, &source, &index, None).resolve_operations(&get(&source, "A", "1.0"));
	assert!(matches!(result, Err(pkgwalk::Error::UnresolvedDependency { .. })));
}

#[test]
fn install_cycle_terminates() {
	init_logger();
	let source = repository([package("A", "1.0").depends("B", None), package("B", "1.0").depends("A", None)]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 1.0.0", "Install A 1.0.0"]);
	assert!(matches!(&plan.warnings[..], [PlanWarning::CircularDependency(_)]));
}

#[test]
fn install_cycle_raises_when_configured() {
	init_logger();
	let source = repository([package("A", "1.0").depends("B", None), package("B", "1.0").depends("A", None)]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let result = InstallWalker::new(&local, &source, &index, None)
		.raise_error_on_cycle(true)
		.resolve_operations(&get(&source, "A", "1.0"));
	assert!(matches!(result, Err(pkgwalk::Error::CircularDependency(_))));
}

#[test]
fn install_keeps_other_installed_versions() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", Some("[2.0,)")),
		package("B", "2.0"),
	]);
	let local = repository([package("B", "1.0")]);
	let index = DependentsWalker::new(&local, None).build().unwrap();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 2.0.0", "Install A 1.0.0"]);
}

#[test]
fn install_session_upgrade_replaces_earlier_choice() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("C", Some("1.0")).depends("B", None),
		package("B", "1.0").depends("C", Some("2.0")),
		package("C", "1.0"),
		package("C", "2.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install C 2.0.0", "Install B 1.0.0", "Install A 1.0.0"]);
	assert!(plan.is_clean());
}

#[test]
fn install_tools_package_goes_to_solution() {
	init_logger();
	let source = repository([
		package("Meta", "1.0").kind(Kind::MetaPackage).depends("Tool", None),
		package("Tool", "1.0").kind(Kind::Tools),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, None)
		.resolve_operations(&get(&source, "Meta", "1.0"))
		.unwrap();
	assert!(plan.operations.iter().all(|o| o.target == pkgwalk::operation::OperationTarget::Solution));

	let plan = InstallWalker::new(&local, &source, &index, None)
		.accepted_targets(AcceptedTargets::Project)
		.resolve_operations(&get(&source, "Meta", "1.0"))
		.unwrap();
	assert!(plan.operations.is_empty());
}

#[test]
fn install_mixed_targets_is_an_error() {
	init_logger();
	let source = repository([
		package("Meta", "1.0").kind(Kind::MetaPackage).depends("Tool", None).depends("Lib", None),
		package("Tool", "1.0").kind(Kind::Tools),
		package("Lib", "1.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let result = InstallWalker::new(&local, &source, &index, None).resolve_operations(&get(&source, "Meta", "1.0"));
	assert!(matches!(result, Err(pkgwalk::Error::MixedDependencyTargets(_))));
}

#[test]
fn install_platform_specific_dependencies() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("Common", None).depends_for("net45", "Desktop", None),
		package("Common", "1.0"),
		package("Desktop", "1.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let plan = InstallWalker::new(&local, &source, &index, Some("NET45".into()))
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install Desktop 1.0.0", "Install A 1.0.0"]);

	let plan = InstallWalker::new(&local, &source, &index, Some("sl5".into()))
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install Common 1.0.0", "Install A 1.0.0"]);
}
