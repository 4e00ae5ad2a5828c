use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One saved HTML snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub current_code: Option<String>,
    #[serde(default)]
    pub conversation: Vec<Message>,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub current_version_index: usize,
}

/// Conversation and version history interleaved for the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEntry<'a> {
    Message(&'a Message),
    Version { version: &'a Version, is_current: bool },
}

impl TimelineEntry<'_> {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Message(message) => message.timestamp,
            Self::Version { version, .. } => version.timestamp,
        }
    }
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            current_code: None,
            conversation: Vec::new(),
            versions: Vec::new(),
            current_version_index: 0,
        }
    }

    /// A project without code is still waiting on its first generation.
    pub fn is_generating(&self) -> bool {
        self.current_code.is_none()
    }

    pub fn current_version(&self) -> Option<&Version> {
        self.versions.get(self.current_version_index)
    }

    /// Messages and versions ordered by timestamp; ties keep messages first.
    pub fn timeline(&self) -> Vec<TimelineEntry<'_>> {
        let current_id = self.current_version().map(|version| version.id.as_str());
        let mut entries = self
            .conversation
            .iter()
            .map(TimelineEntry::Message)
            .chain(self.versions.iter().map(|version| TimelineEntry::Version {
                version,
                is_current: Some(version.id.as_str()) == current_id,
            }))
            .collect::<Vec<_>>();
        entries.sort_by_key(|entry| entry.timestamp());
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::Message;
    use super::Project;
    use super::Role;
    use super::TimelineEntry;
    use super::Version;
    use chrono::TimeZone;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn at(minute: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, minute, 0)
            .single()
            .unwrap_or_else(|| unreachable!())
    }

    fn project() -> Project {
        let mut project = Project::new("p1", "Bakery");
        project.conversation = vec![
            Message {
                id: "m1".to_owned(),
                role: Role::User,
                content: "Make a bakery site".to_owned(),
                timestamp: at(0),
            },
            Message {
                id: "m2".to_owned(),
                role: Role::Assistant,
                content: "Done".to_owned(),
                timestamp: at(5),
            },
        ];
        project.versions = vec![
            Version {
                id: "v1".to_owned(),
                code: "<p>v1</p>".to_owned(),
                timestamp: at(5),
            },
            Version {
                id: "v2".to_owned(),
                code: "<p>v2</p>".to_owned(),
                timestamp: at(2),
            },
        ];
        project.current_version_index = 1;
        project
    }

    #[test]
    fn timeline_interleaves_by_timestamp() {
        let project = project();
        let order = project
            .timeline()
            .into_iter()
            .map(|entry| match entry {
                TimelineEntry::Message(message) => (message.id.clone(), false),
                TimelineEntry::Version {
                    version,
                    is_current,
                } => (version.id.clone(), is_current),
            })
            .collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                ("m1".to_owned(), false),
                ("v2".to_owned(), true),
                ("m2".to_owned(), false),
                ("v1".to_owned(), false),
            ]
        );
    }

    #[test]
    fn projects_without_code_are_generating() {
        let mut project = project();
        assert!(project.is_generating());
        project.current_code = Some("<p>hi</p>".to_owned());
        assert!(!project.is_generating());
    }

    #[test]
    fn deserializes_stored_projects() {
        let raw = r#"{
            "id": "p9",
            "name": "Portfolio",
            "current_code": "<h1>Hi</h1>",
            "conversation": [
                {"id": "m1", "role": "user", "content": "hi", "timestamp": "2025-03-01T12:00:00Z"}
            ],
            "versions": [],
            "current_version_index": 0
        }"#;
        let project = serde_json::from_str::<Project>(raw);
        assert!(project.is_ok());
        let project = project.unwrap_or_else(|_| unreachable!());
        assert_eq!(project.conversation[0].role, Role::User);
        assert_eq!(project.conversation[0].timestamp, at(0));
        assert_eq!(project.current_version(), None);
    }
}
