//! End-to-end runs of the build engine against stub tool executables.
//!
//! The stubs imitate the observable file behavior of the real tools: they
//! parse `-OPTION=VALUE` arguments, read the parser name out of the grammar
//! and drop the expected generated files into the output directory.

#![cfg(unix)]

use javacc_core::engine::{BuildEngine, BuildError, Project, SimpleProject};
use javacc_core::pipeline::{JavaCcPipeline, JjTreeJavaCcPipeline};
use javacc_core::tool::{JavaCc, JjTree, Launcher, ToolError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const GRAMMAR: &str = "options {}\n\
    PARSER_BEGIN(Simple)\n\
    package org.demo;\n\
    public class Simple {}\n\
    PARSER_END(Simple)\n";

/// Shell preamble that extracts the output directory, the input file and
/// the parser name from a JavaCC-style command line.
const STUB_PREAMBLE: &str = r#"#!/bin/sh
out=""
in=""
for a in "$@"; do
  case "$a" in
    -OUTPUT_DIRECTORY=*) out="${a#-OUTPUT_DIRECTORY=}" ;;
    -*) ;;
    *) in="$a" ;;
  esac
done
name=$(sed -n 's/.*PARSER_BEGIN(\([A-Za-z0-9_]*\)).*/\1/p' "$in" | head -n 1)
mkdir -p "$out"
"#;

fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{}{}", STUB_PREAMBLE, body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn javacc_stub(dir: &Path) -> PathBuf {
    write_stub(
        dir,
        "javacc",
        "echo \"class $name {}\" > \"$out/$name.java\"\n\
         echo \"class ${name}TokenManager {}\" > \"$out/${name}TokenManager.java\"\n",
    )
}

fn jjtree_stub(dir: &Path) -> PathBuf {
    write_stub(
        dir,
        "jjtree",
        "base=$(basename \"$in\")\n\
         cp \"$in\" \"$out/${base%.*}.jj\"\n\
         echo \"class ${name}TreeConstants {}\" > \"$out/${name}TreeConstants.java\"\n\
         echo \"class SimpleNode {}\" > \"$out/SimpleNode.java\"\n",
    )
}

fn failing_stub(dir: &Path, name: &str) -> PathBuf {
    write_stub(dir, name, "echo 'Error: stub failure'\nexit 1\n")
}

struct Fixture {
    root: tempfile::TempDir,
    source: PathBuf,
    output: PathBuf,
    interim: PathBuf,
    build: PathBuf,
    stubs: PathBuf,
    project: SimpleProject,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().to_path_buf();
        let source = base.join("src/main/javacc");
        let build = base.join("target");
        let stubs = base.join("stubs");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&stubs).unwrap();
        let project = SimpleProject::new(base.clone(), build.clone());
        Self {
            source,
            output: build.join("generated-sources/javacc"),
            interim: build.join("generated-sources/jjtree"),
            build,
            stubs,
            project,
            root,
        }
    }

    fn write_grammar(&self, relative: &str) {
        let path = self.source.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, GRAMMAR).unwrap();
    }

    fn javacc_engine(&self, launcher: Launcher) -> BuildEngine<JavaCcPipeline> {
        let pipeline = JavaCcPipeline::new(self.output.clone(), JavaCc::new(launcher));
        BuildEngine::new(pipeline, self.source.clone())
    }

    fn jjtree_engine(
        &self,
        jjtree: Launcher,
        javacc: Launcher,
    ) -> BuildEngine<JjTreeJavaCcPipeline> {
        let pipeline = JjTreeJavaCcPipeline::new(
            self.build.clone(),
            self.interim.clone(),
            self.output.clone(),
            None,
            JjTree::new(jjtree),
            JavaCc::new(javacc),
        );
        BuildEngine::new(pipeline, self.source.clone())
    }

    fn scratch_leftovers(&self) -> Vec<PathBuf> {
        match fs::read_dir(&self.build) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .map(|n| n.to_string_lossy().starts_with("javacc-"))
                        .unwrap_or(false)
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[test]
fn plain_pipeline_generates_parser_sources() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jj");
    let launcher = Launcher::from_path(javacc_stub(&fx.stubs));

    fx.javacc_engine(launcher).execute(&mut fx.project).unwrap();

    assert!(fx.output.join("org/demo/Simple.java").is_file());
    assert!(fx.output.join("org/demo/SimpleTokenManager.java").is_file());
    assert!(fx.project.compile_source_roots().contains(&fx.output));
}

#[test]
fn second_run_skips_up_to_date_grammars() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jj");
    let launcher = Launcher::from_path(javacc_stub(&fx.stubs));
    fx.javacc_engine(launcher).execute(&mut fx.project).unwrap();

    // If the engine invoked the tool again this launcher would fail the
    // build, so success proves everything was considered up to date.
    let broken = Launcher::from_path(failing_stub(&fx.stubs, "javacc-broken"));
    fx.javacc_engine(broken).execute(&mut fx.project).unwrap();
}

#[test]
fn missing_source_directory_skips_the_build() {
    let mut fx = Fixture::new();
    let pipeline = JavaCcPipeline::new(
        fx.output.clone(),
        JavaCc::new(Launcher::from_name("javacc")),
    );
    let engine = BuildEngine::new(pipeline, fx.source.join("nowhere"));

    engine.execute(&mut fx.project).unwrap();
    assert!(
        fx.project.compile_source_roots().is_empty(),
        "a skipped build must not register output roots"
    );
}

#[test]
fn tool_failure_aborts_without_registering_roots() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jj");
    let launcher = Launcher::from_path(failing_stub(&fx.stubs, "javacc"));

    let error = fx
        .javacc_engine(launcher)
        .execute(&mut fx.project)
        .unwrap_err();
    assert!(matches!(
        error,
        BuildError::Tool(ToolError::Failed { code: 1, .. })
    ));
    assert!(fx.project.compile_source_roots().is_empty());
}

#[test]
fn chained_pipeline_splits_nodes_and_parser() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jjt");
    let jjtree = Launcher::from_path(jjtree_stub(&fx.stubs));
    let javacc = Launcher::from_path(javacc_stub(&fx.stubs));

    fx.jjtree_engine(jjtree, javacc)
        .execute(&mut fx.project)
        .unwrap();

    assert!(fx.interim.join("org/demo/SimpleNode.java").is_file());
    assert!(fx
        .interim
        .join("org/demo/SimpleTreeConstants.java")
        .is_file());
    assert!(fx.output.join("org/demo/Simple.java").is_file());
    let roots = fx.project.compile_source_roots();
    assert!(roots.contains(&fx.output));
    assert!(roots.contains(&fx.interim));
    assert!(fx.scratch_leftovers().is_empty());
}

#[test]
fn customized_node_classes_are_preserved() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jjt");
    let user_root = fx.root.path().join("src/main/java");
    let custom = user_root.join("org/demo/SimpleNode.java");
    fs::create_dir_all(custom.parent().unwrap()).unwrap();
    fs::write(&custom, "class SimpleNode { custom }").unwrap();
    fx.project.add_compile_source_root(&user_root);

    let jjtree = Launcher::from_path(jjtree_stub(&fx.stubs));
    let javacc = Launcher::from_path(javacc_stub(&fx.stubs));
    fx.jjtree_engine(jjtree, javacc)
        .execute(&mut fx.project)
        .unwrap();

    assert!(
        !fx.interim.join("org/demo/SimpleNode.java").exists(),
        "the hand-maintained node class must not be duplicated"
    );
    assert_eq!(
        fs::read_to_string(&custom).unwrap(),
        "class SimpleNode { custom }"
    );
    // The regenerated constants class is refreshed either way.
    assert!(fx
        .interim
        .join("org/demo/SimpleTreeConstants.java")
        .is_file());
}

#[test]
fn failed_preprocessor_leaves_no_scratch_directories() {
    let mut fx = Fixture::new();
    fx.write_grammar("Simple.jjt");
    let jjtree = Launcher::from_path(failing_stub(&fx.stubs, "jjtree"));
    let javacc = Launcher::from_path(javacc_stub(&fx.stubs));

    let error = fx
        .jjtree_engine(jjtree, javacc)
        .execute(&mut fx.project)
        .unwrap_err();
    assert!(matches!(error, BuildError::Tool(ToolError::Failed { .. })));
    assert!(fx.scratch_leftovers().is_empty());
}
