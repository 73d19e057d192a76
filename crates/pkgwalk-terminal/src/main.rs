use pkgwalk::{Config, MetaDB, PackageRepository};
use pkgwalk::metadb::package::*;
use pkgwalk::relationship_resolver::*;

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",        "Show help");
		opts.optflag( "v", "verbose",     "Increased verbosity");
		opts.optopt(  "c", "config",      "Config file to use instead of the default", "FILE");
		opts.optflag( "f", "force",       "Uninstall even if other packages depend on it");
		opts.optflag( "r", "remove-dependencies", "Also uninstall dependencies nothing else needs");
		opts.optflag( "p", "prerelease",  "Allow prerelease versions");
		opts.optopt(  "d", "dependency-version", "Lowest, HighestPatch, HighestMinor or Highest", "POLICY");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") || parsed_options.free.is_empty() {
			eprintln!("{}", opts.usage("Usage: pkgwalk-terminal [options] sort <repository.json>\n       pkgwalk-terminal [options] <install|uninstall|update> <repository.json> <installed.json> <id> [version]"));
			return;
		}

		parsed_options
	};

	let mut logger = env_logger::Builder::from_default_env();
	if parsed_options.opt_present("v") {
		logger.filter_level(log::LevelFilter::Debug);
	}
	logger.init();

	let config = match parsed_options.opt_str("c") {
		Some(path) => Config::load_from_file(path),
		None => Config::load_from_disk(),
	};
	let mut config = config.unwrap_or_else(|e| {
		log::warn!("Failed to read config file: {}", e);
		log::warn!("Using default config.");
		Config::default()
	});

	if parsed_options.opt_present("f") {
		config.set_force_remove(true);
	}
	if parsed_options.opt_present("r") {
		config.set_remove_dependencies(true);
	}
	if parsed_options.opt_present("p") {
		config.set_allow_prerelease(true);
	}
	if let Some(policy) = parsed_options.opt_str("d") {
		match policy.parse() {
			Ok(p) => config.set_dependency_version(p),
			Err(e) => { log::error!("{}", e); return },
		}
	}

	if let Err(e) = run(&config, &parsed_options.free) {
		log::error!("{}", e);
		std::process::exit(1);
	}
}

fn run(config: &Config, free: &[String]) -> Result<(), Error> {
	let command = free[0].as_str();
	let source = MetaDB::load_from_file(free.get(1).ok_or(Error::MissingArgument("repository"))?)?;

	if command == "sort" {
		let mut sorter = PackageSorter::new(&source, config.target_platform().cloned())
			.raise_error_on_cycle(config.raise_error_on_cycle());
		for package in sorter.get_packages_by_dependency_order()? {
			println!("{}", package);
		}
		for cycle in sorter.cycles() {
			log::warn!("Circular dependency between {}", cycle.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", "));
		}
		return Ok(())
	}

	let installed = MetaDB::load_from_file(free.get(2).ok_or(Error::MissingArgument("installed"))?)?;
	let id = free.get(3).ok_or(Error::MissingArgument("id"))?;
	let version = free.get(4).map(PackageVersion::new).transpose()?;
	let index = DependentsWalker::new(&installed, config.target_platform().cloned()).build()?;
	let constraints = config.constraint_provider();

	let plan = match command {
		"install" => {
			let package = find_package(config, &source, id, version.as_ref())?;
			InstallWalker::new(&installed, &source, &index, config.target_platform().cloned())
				.configure(config)
				.constraint_provider(&constraints)
				.resolve_operations(&package)?
		},
		"update" => {
			let package = find_package(config, &source, id, version.as_ref())?;
			UpdateWalker::new(&installed, &source, &index, config.target_platform().cloned(), !config.ignore_dependencies())
				.configure(config)
				.constraint_provider(&constraints)
				.resolve_operations(&package)?
		},
		"uninstall" => {
			let package = find_package(config, &installed, id, version.as_ref())?;
			UninstallWalker::new(&installed, &index, config.target_platform().cloned(), config.remove_dependencies(), config.force_remove())
				.configure(config)
				.resolve_operations(&package)?
		},
		_ => return Err(Error::UnknownCommand(command.to_string())),
	};

	print_plan(&plan);
	Ok(())
}

/// The requested version, or the highest listed version allowed by the config.
fn find_package(config: &Config, repository: &MetaDB, id: &str, version: Option<&PackageVersion>) -> Result<Package, Error> {
	let found = match version {
		Some(version) => repository.find_package(id, version),
		None => repository.find_packages_by_id(id)
			.into_iter()
			.filter(|p| p.listed && (config.allow_prerelease() || p.is_release_version()))
			.max(),
	};
	found.cloned().ok_or_else(|| Error::PackageNotFound(id.to_string()))
}

fn print_plan(plan: &OperationPlan) {
	if plan.operations.is_empty() {
		println!("Nothing to do.");
	}
	for operation in &plan.operations {
		println!("{} ({:?})", operation, operation.target);
	}
	for conflict in &plan.conflicts {
		println!("Conflict: {}", conflict);
	}
	for warning in &plan.warnings {
		println!("Warning: {}", warning);
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pkgwalk error: {0}")]
	Pkgwalk(#[from] pkgwalk::Error),
	#[error("missing argument <{0}>")]
	MissingArgument(&'static str),
	#[error("unknown command \"{0}\"")]
	UnknownCommand(String),
	#[error("package \"{0}\" not found")]
	PackageNotFound(String),
}
