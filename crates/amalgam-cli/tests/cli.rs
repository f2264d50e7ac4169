//! Failure paths of the `amalgamate` binary
//!
//! Every failure must leave standard output empty.

use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LICENSE: &str = "/*\n   Copyright 2024 The PLYwoot Authors\n*/\n";

fn write_library(root: &Path, std_hpp: &str) {
    let lib = root.join("include/plywoot");
    fs::create_dir_all(lib.join("plywoot")).unwrap();
    fs::write(
        lib.join("plywoot.hpp"),
        format!("{LICENSE}#include \"plywoot/std.hpp\"\n#include <vector>\n"),
    )
    .unwrap();
    fs::write(lib.join("plywoot/std.hpp"), std_hpp).unwrap();
}

#[test]
fn missing_bundled_reference_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_library(
        temp.path(),
        &format!(
            "{LICENSE}#ifndef PLYWOOT_STD_HPP\n#define PLYWOOT_STD_HPP\n\
             #ifdef PLYWOOT_HAS_FAST_FLOAT\n#include <fast_float/fast_float.h>\n#endif\n\
             namespace plywoot {{}}\n#endif\n"
        ),
    );

    cargo_bin_cmd!("amalgamate")
        .arg("--root")
        .arg(temp.path())
        .arg("--engine")
        .arg("/nonexistent/bin/g++")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicates::str::contains("fast_int/fast_int.hpp"));
}

#[test]
fn missing_preprocessor_fails_without_output() {
    let temp = TempDir::new().unwrap();
    write_library(
        temp.path(),
        &format!(
            "{LICENSE}#ifndef PLYWOOT_STD_HPP\n#define PLYWOOT_STD_HPP\n\
             #include <fast_float/fast_float.h>\n#include <fast_int/fast_int.hpp>\n\
             namespace plywoot {{}}\n#endif\n"
        ),
    );

    cargo_bin_cmd!("amalgamate")
        .arg("--root")
        .arg(temp.path())
        .arg("--engine")
        .arg("/nonexistent/bin/g++")
        .assert()
        .failure()
        .stdout("");
}

#[test]
fn missing_library_root_fails_without_output() {
    let temp = TempDir::new().unwrap();

    cargo_bin_cmd!("amalgamate")
        .arg("--root")
        .arg(temp.path())
        .arg("--engine")
        .arg("/nonexistent/bin/g++")
        .assert()
        .failure()
        .stdout("");
}
