use pkgwalk::Config;
use pkgwalk::MetaDB;
use pkgwalk::PackageRepository;
use pkgwalk::metadb::DependencyVersion;
use pkgwalk::operation::AcceptedTargets;
use pkgwalk::relationship_resolver::*;
use pkgwalk_test_utils::*;

#[test]
fn config_save_and_load() {
	init_logger();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("nested").join("config.json");

	let mut config = Config::default();
	config.set_dependency_version(DependencyVersion::HighestMinor);
	config.set_accepted_targets(AcceptedTargets::Project);
	config.set_force_remove(true);
	config.add_constraint("B", range("[1.0,2.0)"));
	config.save_to_file(&path).unwrap();

	let loaded = Config::load_from_file(&path).unwrap();
	assert_eq!(loaded.dependency_version(), DependencyVersion::HighestMinor);
	assert_eq!(loaded.accepted_targets(), AcceptedTargets::Project);
	assert!(loaded.force_remove());
	assert_eq!(loaded.constraints().get("B"), Some(&range("[1.0,2.0)")));
}

#[test]
fn config_missing_file_is_io_error() {
	let dir = tempfile::tempdir().unwrap();
	assert!(matches!(Config::load_from_file(dir.path().join("missing.json")), Err(pkgwalk::Error::IO(_))));
}

#[test]
fn config_drives_install() {
	init_logger();
	let source = repository([
		package("A", "1.0").depends("B", Some("1.0")),
		package("B", "1.0"),
		package("B", "1.5"),
		package("B", "2.0"),
	]);
	let local = MetaDB::new();
	let index = DependentsIndex::default();

	let mut config = Config::default();
	config.set_dependency_version(DependencyVersion::Highest);
	config.add_constraint("b", range("(,2.0)"));
	let constraints = config.constraint_provider();

	let plan = InstallWalker::new(&local, &source, &index, config.target_platform().cloned())
		.configure(&config)
		.constraint_provider(&constraints)
		.resolve_operations(&get(&source, "A", "1.0"))
		.unwrap();
	assert_eq!(operation_names(&plan.operations), vec!["Install B 1.5.0", "Install A 1.0.0"]);
}

#[test]
fn metadb_save_and_load() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("repository.json");
	let db = repository([package("A", "1.0").depends("B", Some("[1.0,2.0)")), package("B", "1.0-beta").delisted()]);
	db.save_to_file(&path).unwrap();

	let loaded = MetaDB::load_from_file(&path).unwrap();
	assert_eq!(loaded.len(), 2);
	assert!(!get(&loaded, "B", "1.0-beta").listed);
	assert_eq!(get(&loaded, "A", "1.0").dependency_sets, get(&db, "A", "1.0").dependency_sets);
	assert!(loaded.exists(&identifier("a", "1.0")));
}
