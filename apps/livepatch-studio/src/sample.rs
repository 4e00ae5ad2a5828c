use chrono::DateTime;
use chrono::Utc;
use lp_preview::Message;
use lp_preview::Project;
use lp_preview::Role;
use lp_preview::Version;
use std::path::Path;

const FIRST_DRAFT: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Crumb &amp; Crust</title>
<style>
body { background: #fdf8f2; color: #3b2f2f; }
.hero { padding: 24px; background-color: #f4e1c6; }
</style>
</head>
<body>
<header class="hero"><h1 id="title">Crumb &amp; Crust</h1><p>Fresh bread every morning.</p></header>
<section id="menu"><h2>Menu</h2><ul><li>Sourdough</li><li>Rye</li><li>Focaccia</li></ul></section>
</body>
</html>"#;

const SECOND_DRAFT: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Crumb &amp; Crust</title>
<style>
body { background: #fdf8f2; color: #3b2f2f; }
.hero { padding: 32px 24px; background-color: #f4e1c6; }
.hero h1 { color: #8a3b12; }
.note { font-size: 14px; color: #6b5b53; }
footer { padding: 16px; background-color: #3b2f2f; color: #fdf8f2; }
</style>
</head>
<body>
<header class="hero"><h1 id="title">Crumb &amp; Crust</h1><p>Fresh bread every morning, baked in a wood-fired oven.</p></header>
<section id="menu">
<h2>Menu</h2>
<ul><li>Sourdough</li><li>Rye</li><li>Focaccia</li><li>Cinnamon knots</li></ul>
<p class="note">Ask about gluten-free loaves.</p>
</section>
<section id="visit"><h2>Visit</h2><p>12 Mill Lane. Open Tuesday to Sunday, 7am until sold out.</p></section>
<footer><small>Crumb &amp; Crust bakery</small></footer>
</body>
</html>"#;

fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

/// A two-version bakery site with the conversation that produced it.
pub(crate) fn sample_project() -> Project {
    let base = 1_740_830_400;
    let mut project = Project::new("sample", "Crumb & Crust");
    project.conversation = vec![
        message("m1", Role::User, "Build a landing page for my bakery.", at(base)),
        message("m2", Role::Assistant, "Here is a first draft with a hero and menu.", at(base + 40)),
        message("m3", Role::User, "Add opening hours and a footer.", at(base + 300)),
        message("m4", Role::Assistant, "Added a visit section and a footer.", at(base + 345)),
    ];
    project.versions = vec![
        version("v1", FIRST_DRAFT, at(base + 40)),
        version("v2", SECOND_DRAFT, at(base + 345)),
    ];
    project.current_version_index = 1;
    project.current_code = Some(SECOND_DRAFT.to_owned());
    project
}

/// Wraps an HTML file opened from disk as a single-version project.
pub(crate) fn file_project(path: &Path, html: String) -> Project {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_owned());
    let mut project = Project::new(path.display().to_string(), name);
    project.versions = vec![version("v1", &html, Utc::now())];
    project.current_code = Some(html);
    project
}

fn message(id: &str, role: Role, content: &str, timestamp: DateTime<Utc>) -> Message {
    Message {
        id: id.to_owned(),
        role,
        content: content.to_owned(),
        timestamp,
    }
}

fn version(id: &str, code: &str, timestamp: DateTime<Utc>) -> Version {
    Version {
        id: id.to_owned(),
        code: code.to_owned(),
        timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::file_project;
    use super::sample_project;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    #[test]
    fn sample_opens_on_its_latest_version() {
        let project = sample_project();
        assert!(!project.is_generating());
        assert_eq!(project.current_version().map(|version| version.id.as_str()), Some("v2"));
        assert_eq!(project.timeline().len(), 6);
    }

    #[test]
    fn file_projects_are_named_after_the_file() {
        let project = file_project(Path::new("/tmp/site/index.html"), "<p>hi</p>".to_owned());
        assert_eq!(project.name, "index.html");
        assert_eq!(project.current_code.as_deref(), Some("<p>hi</p>"));
        assert_eq!(project.versions.len(), 1);
    }
}
