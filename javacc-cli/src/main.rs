//! Command-line driver for the grammar build engine.
//!
//! Usage:
//!   javacc-build javacc [options]         - Generate parsers from .jj grammars
//!   javacc-build jjtree-javacc [options]  - Tree builder + parser generation
//!   javacc-build jtb-javacc [options]     - JTB + parser generation
//!   javacc-build jjdoc [options]          - Generate grammar documentation
//!   javacc-build jjtree [options]         - Tree builder preprocessing only
//!   javacc-build jtb [options]            - JTB preprocessing only
//!
//! Configuration comes from an embedded default set layered under an
//! optional `javacc-build.toml` in the project directory; `--set` applies
//! single-key overrides on top.

use clap::{Arg, ArgAction, Command};
use javacc_config::{BuildConfig, Loader, PROJECT_FILE};
use javacc_core::engine::{BuildEngine, Project, SimpleProject};
use javacc_core::pipeline::{
    JavaCcPipeline, JjDocPipeline, JjTreeJavaCcPipeline, JjTreePreprocessor, JtbJavaCcPipeline,
    JtbPreprocessor, Pipeline,
};
use javacc_core::tool::{ForkedJvm, JavaCc, JjDoc, JjTree, Jtb, Launcher};
use std::path::{Path, PathBuf};

fn main() {
    let matches = Command::new("javacc-build")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Builds Java parsers from JavaCC-family grammars")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("project-dir")
                .long("project-dir")
                .short('p')
                .help("Project directory (defaults to the current directory)")
                .default_value(".")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file (defaults to javacc-build.toml in the project directory)")
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a single configuration key, e.g. --set javacc.lookahead=2")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Increase log verbosity (repeatable)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(Command::new("javacc").about("Generate parsers from .jj grammars"))
        .subcommand(
            Command::new("jjtree-javacc")
                .about("Run the tree builder, then generate parsers from its output"),
        )
        .subcommand(Command::new("jtb-javacc").about("Run JTB, then generate parsers from its output"))
        .subcommand(Command::new("jjdoc").about("Generate BNF documentation for the grammars"))
        .subcommand(Command::new("jjtree").about("Tree builder preprocessing only"))
        .subcommand(Command::new("jtb").about("JTB preprocessing only"))
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let (goal, _) = matches
        .subcommand()
        .expect("arg_required_else_help guarantees a subcommand");

    let project_dir = absolutize(Path::new(
        matches
            .get_one::<String>("project-dir")
            .expect("project-dir has a default"),
    ));
    let overrides: Vec<String> = matches
        .get_many::<String>("set")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let config = load_config(
        &project_dir,
        matches.get_one::<String>("config").map(String::as_str),
        &overrides,
    );

    let mut project = new_project(&project_dir, &config);
    let result = match goal {
        "javacc" => run_javacc(&project_dir, &config, &mut project),
        "jjtree-javacc" => run_jjtree_javacc(&project_dir, &config, &mut project),
        "jtb-javacc" => run_jtb_javacc(&project_dir, &config, &mut project),
        "jjdoc" => run_jjdoc(&project_dir, &config, &mut project),
        "jjtree" => run_jjtree(&project_dir, &config, &mut project),
        "jtb" => run_jtb(&project_dir, &config, &mut project),
        other => {
            eprintln!("Unknown goal: {}", other);
            std::process::exit(2);
        }
    };

    if let Err(error) = result {
        eprintln!("Build failed: {}", error);
        std::process::exit(1);
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn load_config(project_dir: &Path, config_file: Option<&str>, overrides: &[String]) -> BuildConfig {
    let mut loader = match config_file {
        Some(file) => Loader::new().with_file(file),
        None => Loader::new().with_optional_file(project_dir.join(PROJECT_FILE)),
    };
    for entry in overrides {
        let (key, value) = match entry.split_once('=') {
            Some(pair) => pair,
            None => {
                eprintln!("Invalid --set value (expected KEY=VALUE): {}", entry);
                std::process::exit(2);
            }
        };
        loader = loader.set_override(key, value).unwrap_or_else(|error| {
            eprintln!("Invalid override {}: {}", entry, error);
            std::process::exit(2);
        });
    }
    loader.build().unwrap_or_else(|error| {
        eprintln!("Configuration error: {}", error);
        std::process::exit(2);
    })
}

fn new_project(project_dir: &Path, config: &BuildConfig) -> SimpleProject {
    let build_directory = resolve(project_dir, &config.project.build_directory);
    let roots = config
        .project
        .compile_source_roots
        .iter()
        .map(|root| resolve(project_dir, root))
        .collect();
    SimpleProject::new(project_dir.to_path_buf(), build_directory)
        .with_compile_source_roots(roots)
}

type RunResult = Result<(), javacc_core::engine::BuildError>;

fn run_javacc(project_dir: &Path, config: &BuildConfig, project: &mut dyn Project) -> RunResult {
    let pipeline = JavaCcPipeline::new(
        resolve(project_dir, &config.javacc.output_directory),
        new_javacc(config),
    );
    let mut engine = BuildEngine::new(
        pipeline,
        resolve(project_dir, &config.javacc.source_directory),
    );
    if let Some(includes) = &config.javacc.includes {
        engine.set_includes(includes.clone());
    }
    engine
        .set_excludes(config.scan.excludes.clone())
        .set_stale_millis(config.scan.stale_millis)
        .set_package_override(config.javacc.package_name.clone())
        .set_encodings(
            config.javacc.grammar_encoding.clone(),
            config.javacc.output_encoding.clone(),
        );
    engine.execute(project)
}

fn run_jjtree_javacc(
    project_dir: &Path,
    config: &BuildConfig,
    project: &mut dyn Project,
) -> RunResult {
    let pipeline = JjTreeJavaCcPipeline::new(
        resolve(project_dir, &config.project.build_directory),
        resolve(project_dir, &config.jjtree.interim_directory),
        resolve(project_dir, &config.jjtree.output_directory),
        config.jjtree.node_package.clone(),
        new_jjtree(config),
        new_javacc(config),
    );
    run_generic(pipeline, project_dir, config, project, Goal::JjTree)
}

fn run_jtb_javacc(
    project_dir: &Path,
    config: &BuildConfig,
    project: &mut dyn Project,
) -> RunResult {
    let pipeline = JtbJavaCcPipeline::new(
        resolve(project_dir, &config.project.build_directory),
        resolve(project_dir, &config.jtb.interim_directory),
        resolve(project_dir, &config.jtb.output_directory),
        config.jtb.package_name.clone(),
        config.jtb.node_package_name.clone(),
        config.jtb.visitor_package_name.clone(),
        new_jtb(config),
        new_javacc(config),
    );
    run_generic(pipeline, project_dir, config, project, Goal::Jtb)
}

fn run_jjdoc(project_dir: &Path, config: &BuildConfig, project: &mut dyn Project) -> RunResult {
    let pipeline = JjDocPipeline::new(
        resolve(project_dir, &config.jjdoc.output_directory),
        new_jjdoc(config),
    );
    let mut engine = BuildEngine::new(
        pipeline,
        resolve(project_dir, &config.jjdoc.source_directory),
    );
    if let Some(includes) = &config.jjdoc.includes {
        engine.set_includes(includes.clone());
    }
    engine
        .set_excludes(config.scan.excludes.clone())
        .set_stale_millis(config.scan.stale_millis);
    engine.execute(project)
}

fn run_jjtree(project_dir: &Path, config: &BuildConfig, project: &mut dyn Project) -> RunResult {
    let pipeline = JjTreePreprocessor::new(
        resolve(project_dir, &config.jjtree.output_directory),
        resolve(project_dir, &config.jjtree.timestamp_directory),
        config.jjtree.node_package.clone(),
        new_jjtree(config),
    );
    run_generic(pipeline, project_dir, config, project, Goal::JjTree)
}

fn run_jtb(project_dir: &Path, config: &BuildConfig, project: &mut dyn Project) -> RunResult {
    let pipeline = JtbPreprocessor::new(
        resolve(project_dir, &config.jtb.output_directory),
        resolve(project_dir, &config.jtb.timestamp_directory),
        config.jtb.package_name.clone(),
        config.jtb.node_package_name.clone(),
        config.jtb.visitor_package_name.clone(),
        new_jtb(config),
    );
    run_generic(pipeline, project_dir, config, project, Goal::Jtb)
}

/// Which goal family supplies source directory, includes and encoding.
enum Goal {
    JjTree,
    Jtb,
}

fn run_generic<P: Pipeline>(
    pipeline: P,
    project_dir: &Path,
    config: &BuildConfig,
    project: &mut dyn Project,
    goal: Goal,
) -> RunResult {
    let (source_directory, includes, grammar_encoding) = match goal {
        Goal::JjTree => (
            &config.jjtree.source_directory,
            &config.jjtree.includes,
            config.jjtree.grammar_encoding.clone(),
        ),
        Goal::Jtb => (
            &config.jtb.source_directory,
            &config.jtb.includes,
            config.javacc.grammar_encoding.clone(),
        ),
    };
    let mut engine = BuildEngine::new(pipeline, resolve(project_dir, source_directory));
    if let Some(includes) = includes {
        engine.set_includes(includes.clone());
    }
    engine
        .set_excludes(config.scan.excludes.clone())
        .set_stale_millis(config.scan.stale_millis)
        .set_encodings(grammar_encoding, config.javacc.output_encoding.clone());
    engine.execute(project)
}

fn new_javacc(config: &BuildConfig) -> JavaCc {
    let settings = &config.javacc;
    let mut javacc = JavaCc::new(launcher(&config.tools.javacc));
    javacc.grammar_encoding = settings.grammar_encoding.clone();
    javacc.jdk_version = settings.jdk_version.clone();
    javacc.lookahead = settings.lookahead;
    javacc.choice_ambiguity_check = settings.choice_ambiguity_check;
    javacc.other_ambiguity_check = settings.other_ambiguity_check;
    javacc.is_static = settings.is_static;
    javacc.debug_parser = settings.debug_parser;
    javacc.debug_lookahead = settings.debug_lookahead;
    javacc.debug_token_manager = settings.debug_token_manager;
    javacc.error_reporting = settings.error_reporting;
    javacc.java_unicode_escape = settings.java_unicode_escape;
    javacc.unicode_input = settings.unicode_input;
    javacc.ignore_case = settings.ignore_case;
    javacc.common_token_action = settings.common_token_action;
    javacc.user_token_manager = settings.user_token_manager;
    javacc.user_char_stream = settings.user_char_stream;
    javacc.build_parser = settings.build_parser;
    javacc.build_token_manager = settings.build_token_manager;
    javacc.token_manager_uses_parser = settings.token_manager_uses_parser;
    javacc.token_extends = settings.token_extends.clone();
    javacc.token_factory = settings.token_factory.clone();
    javacc.sanity_check = settings.sanity_check;
    javacc.force_la_check = settings.force_la_check;
    javacc.cache_tokens = settings.cache_tokens;
    javacc.keep_line_column = settings.keep_line_column;
    javacc.support_class_visibility_public = settings.support_class_visibility_public;
    javacc
}

fn new_jjtree(config: &BuildConfig) -> JjTree {
    let settings = &config.jjtree;
    let mut jjtree = JjTree::new(launcher(&config.tools.jjtree));
    jjtree.grammar_encoding = settings.grammar_encoding.clone();
    jjtree.jdk_version = settings.jdk_version.clone();
    jjtree.build_node_files = settings.build_node_files;
    jjtree.multi = settings.multi;
    jjtree.node_default_void = settings.node_default_void;
    jjtree.node_class = settings.node_class.clone();
    jjtree.node_factory = settings.node_factory.clone();
    jjtree.node_prefix = settings.node_prefix.clone();
    jjtree.node_scope_hook = settings.node_scope_hook;
    jjtree.node_uses_parser = settings.node_uses_parser;
    jjtree.track_tokens = settings.track_tokens;
    jjtree.is_static = settings.is_static;
    jjtree.visitor = settings.visitor;
    jjtree.visitor_data_type = settings.visitor_data_type.clone();
    jjtree.visitor_return_type = settings.visitor_return_type.clone();
    jjtree.visitor_exception = settings.visitor_exception.clone();
    jjtree
}

fn new_jtb(config: &BuildConfig) -> Jtb {
    let settings = &config.jtb;
    let mut jtb = Jtb::new(launcher(&config.tools.jtb));
    jtb.suppress_error_checking = settings.suppress_error_checking;
    jtb.javadoc_friendly_comments = settings.javadoc_friendly_comments;
    jtb.descriptive_field_names = settings.descriptive_field_names;
    jtb.node_parent_class = settings.node_parent_class.clone();
    jtb.parent_pointers = settings.parent_pointers;
    jtb.special_tokens = settings.special_tokens;
    jtb.scheme = settings.scheme;
    jtb.printer = settings.printer;
    jtb
}

fn new_jjdoc(config: &BuildConfig) -> JjDoc {
    let mut jvm = ForkedJvm::new();
    if let Some(java) = &config.tools.java {
        jvm.set_java(java);
    }
    jvm.set_main_class(&config.tools.jjdoc_main_class);
    for entry in &config.tools.classpath {
        jvm.add_class_path_entry(entry);
    }
    for entry in &config.tools.classpath_urls {
        if let Err(error) = jvm.add_class_path_url(&entry.url, &entry.resource) {
            eprintln!("Configuration error: {}", error);
            std::process::exit(2);
        }
    }
    let settings = &config.jjdoc;
    let mut jjdoc = JjDoc::new(jvm);
    jjdoc.grammar_encoding = settings.grammar_encoding.clone();
    jjdoc.output_encoding = settings.output_encoding.clone();
    jjdoc.css_href = settings.css_href.clone();
    jjdoc.text = settings.text;
    jjdoc.bnf = settings.bnf;
    jjdoc.one_table = settings.one_table;
    jjdoc
}

/// An explicit path (anything with a separator) is used as-is; a bare name
/// goes through the search path at run time.
fn launcher(program: &str) -> Launcher {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        Launcher::from_path(program)
    } else {
        Launcher::from_name(program)
    }
}

fn resolve(project_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_dir.join(path)
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}
