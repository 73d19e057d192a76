use pkgwalk::MetaDB;
use pkgwalk::relationship_resolver::*;
use pkgwalk_test_utils::*;

fn uninstall(installed: &MetaDB, id: &str, remove_dependencies: bool, force: bool) -> pkgwalk::Result<OperationPlan> {
	let index = DependentsWalker::new(installed, None).build()?;
	UninstallWalker::new(installed, &index, None, remove_dependencies, force)
		.resolve_operations(&get(installed, id, "1.0"))
}

#[test]
fn uninstall_with_dependents_names_them() {
	init_logger();
	let installed = repository([package("A", "1.0"), package("B", "1.0").depends("A", None)]);

	let error = uninstall(&installed, "A", false, false).unwrap_err();
	assert_eq!(error.to_string(), "unable to uninstall 'A 1.0.0' because 'B 1.0.0' depend(s) on it");
}

#[test]
fn uninstall_forced_with_dependents() {
	init_logger();
	let installed = repository([package("A", "1.0"), package("B", "1.0").depends("A", None)]);

	let plan = uninstall(&installed, "A", false, true).unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Uninstall A 1.0.0"]);
	assert_eq!(plan.warnings, vec![PlanWarning::BrokenDependents { package: identifier("A", "1.0"), dependents: vec![identifier("B", "1.0")] }]);
}

#[test]
fn uninstall_satellite_before_runtime() {
	init_logger();
	let installed = repository([
		package("A", "1.0"),
		package("A.fr", "1.0").language("fr").depends("A", Some("[1.0]")),
	]);

	let plan = uninstall(&installed, "A.fr", true, false).unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Uninstall A.fr 1.0.0", "Uninstall A 1.0.0"]);
}

#[test]
fn uninstall_runtime_with_satellite_installed() {
	init_logger();
	let installed = repository([
		package("A", "1.0"),
		package("A.fr", "1.0").language("fr").depends("A", Some("[1.0]")),
	]);

	assert!(matches!(uninstall(&installed, "A", false, false), Err(pkgwalk::Error::HasDependents { .. })));
}

#[test]
fn uninstall_removes_unused_dependency_chain() {
	init_logger();
	let installed = repository([
		package("A", "1.0").depends("B", None),
		package("B", "1.0").depends("C", None),
		package("C", "1.0"),
		package("D", "1.0").depends("C", None),
	]);

	let plan = uninstall(&installed, "A", true, false).unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Uninstall A 1.0.0", "Uninstall B 1.0.0"]);
	assert_eq!(plan.warnings.len(), 1);
}

#[test]
fn uninstall_diamond_removes_shared_dependency_once() {
	init_logger();
	let installed = repository([
		package("A", "1.0").depends("B", None).depends("C", None),
		package("B", "1.0").depends("D", None),
		package("C", "1.0").depends("D", None),
		package("D", "1.0"),
	]);

	let plan = uninstall(&installed, "A", true, false).unwrap();
	let names = operation_names(&plan.operations);
	assert_eq!(names.len(), 4);
	assert_eq!(names[0], "Uninstall A 1.0.0");
	assert_eq!(names[3], "Uninstall D 1.0.0");
}

#[test]
fn uninstall_cycle_terminates() {
	init_logger();
	let installed = repository([package("A", "1.0").depends("B", None), package("B", "1.0").depends("A", None)]);
	let index = DependentsWalker::new(&installed, None).build().unwrap();

	let plan = UninstallWalker::new(&installed, &index, None, true, true)
		.resolve_operations(&get(&installed, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Uninstall A 1.0.0", "Uninstall B 1.0.0"]);
}
