//! End-to-end tests of the `gallery-kit` binary against small sites built
//! in temporary directories.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const FELLOWSHIP: &str = r#"{
  "heading": "2025 Fellows",
  "fellows": [
    {
      "id": "ab",
      "name": "Ada Brandt",
      "bio": "Prints **large**.",
      "image": "/img/ab-1.jpg",
      "image_type": "carousel",
      "additional_images": [{ "src": "/img/ab-2.jpg" }]
    }
  ]
}"#;

const NAVIGATION: &str = r#"[
  { "label": "fellowship", "href": "program/fellowship.html" },
  { "label": "about", "children": [
    { "label": "mission", "href": "about/mission.html" },
    { "label": "team", "href": "about/team.html" }
  ]}
]"#;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "<html></html>").unwrap();
}

/// A site with a menu document and one missing menu target
/// (`about/team.html`). The config lives in the site root.
fn site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    touch(root, "index.html");
    touch(root, "program/fellowship.html");
    touch(root, "about/mission.html");
    fs::write(root.join("fellowship-data.json"), FELLOWSHIP).unwrap();
    fs::write(
        root.join("exhibition-data.json"),
        r#"{"title": "Tidelines", "images": [{"url": "/img/ex-1.jpg"}]}"#,
    )
    .unwrap();
    fs::write(root.join("navigation-data.json"), NAVIGATION).unwrap();
    fs::write(
        root.join("site.toml"),
        "[content]\nnavigation_data = \"/navigation-data.json\"\n",
    )
    .unwrap();
    tmp
}

fn run(site: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gallery-kit"))
        .arg("--config")
        .arg(site)
        .args(args)
        .output()
        .expect("failed to run gallery-kit")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn gen_config_prints_documented_defaults() {
    let tmp = TempDir::new().unwrap();
    let out = run(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("[carousel]"));
    assert!(text.contains("interval_ms = 4000"));
}

#[test]
fn candidates_are_listed_in_probe_order() {
    let tmp = site();
    let out = run(
        tmp.path(),
        &["candidates", "--page", "/program/calendar.html", "about/mission.html"],
    );
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "about/mission.html from /program/calendar.html (depth 1)");
    assert_eq!(lines[1], "    001 ../about/mission.html");
    assert_eq!(lines[2], "    002 /about/mission.html");
}

#[test]
fn resolve_against_site_directory() {
    let tmp = site();
    let site = tmp.path().to_str().unwrap();
    let out = run(
        tmp.path(),
        &["resolve", "--page", "/program/fellowship.html", "--site", site, "about/mission.html"],
    );
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.contains("    ../about/mission.html: found"));
    assert!(text.contains("about/mission.html \u{2192} ../about/mission.html (probe)"));
}

#[test]
fn unresolved_target_exits_nonzero() {
    let tmp = site();
    let site = tmp.path().to_str().unwrap();
    let out = run(tmp.path(), &["resolve", "--site", site, "about/team.html"]);
    assert!(!out.status.success());
    assert!(stdout(&out).contains("about/team.html: not found"));
}

#[test]
fn resolve_requires_a_site_or_url() {
    let tmp = site();
    let out = run(tmp.path(), &["resolve", "about/team.html"]);
    assert!(!out.status.success());
}

#[test]
fn check_reports_dead_menu_links() {
    let tmp = site();
    let site = tmp.path().to_str().unwrap();
    let out = run(tmp.path(), &["check", site]);
    assert!(!out.status.success());
    let text = stdout(&out);
    assert!(text.contains("001 /about/mission.html"));
    assert!(text.contains("    about/team.html: not found"));
    assert!(text.contains("Checked 3 pages, 3 unresolved links, 0 broken documents"));
}

#[test]
fn check_passes_once_the_page_exists() {
    let tmp = site();
    touch(tmp.path(), "about/team.html");
    let site = tmp.path().to_str().unwrap();
    let out = run(tmp.path(), &["check", site]);
    assert!(out.status.success(), "{}", stdout(&out));
}

#[test]
fn render_writes_fellowship_page() {
    let tmp = site();
    let site = tmp.path().to_str().unwrap();
    let html_path = tmp.path().join("rendered.html");
    let out = run(
        tmp.path(),
        &[
            "render",
            "--page",
            "/program/fellowship.html",
            site,
            "--out",
            html_path.to_str().unwrap(),
        ],
    );
    assert!(out.status.success());
    let html = fs::read_to_string(html_path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Ada Brandt"));
    assert!(html.contains("<strong>large</strong>"));
    assert!(html.contains("/img/ab-2.jpg"));
}

#[test]
fn render_exhibition_to_stdout() {
    let tmp = site();
    let site = tmp.path().to_str().unwrap();
    let out = run(tmp.path(), &["render-exhibition", site]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Tidelines"));
}

#[test]
fn invalid_config_is_an_error() {
    let tmp = site();
    fs::write(tmp.path().join("site.toml"), "[carousel]\nbogus = 1\n").unwrap();
    let out = run(tmp.path(), &["gen-config"]);
    assert!(out.status.success());
    let out = run(tmp.path(), &["candidates", "about/mission.html"]);
    assert!(!out.status.success());
}
