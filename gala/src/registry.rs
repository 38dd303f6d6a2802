//! Member registry: the roster of staff and students, loaded once.
//!
//! Rosters are tab-separated text, one member per line:
//!
//! - students: `id  last name  first name  phone  email  year`
//! - staff: `id  last name  first name  phone  email`
//!
//! Ids must be unique across both files.

use crate::error::GalaError;
use crate::types::{Category, Contact, Member, MemberId, MemberKind, StudyYear};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors while loading a roster
#[derive(Error, Debug)]
pub enum RosterError {
    /// The roster file could not be read
    #[error("Cannot read roster {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line does not match the roster format
    #[error("{source_name}:{line}: {reason}")]
    Malformed {
        /// Roster name (file path or label)
        source_name: String,
        /// 1-based line number
        line: usize,
        /// What is wrong with it
        reason: String,
    },

    /// The same id appears twice
    #[error("Member id {0} appears more than once")]
    DuplicateMember(MemberId),
}

/// Immutable set of members keyed by id
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberRegistry {
    members: BTreeMap<MemberId, Member>,
}

impl MemberRegistry {
    /// Build a registry from member records
    ///
    /// # Errors
    ///
    /// Returns [`RosterError::DuplicateMember`] if two records share an id.
    pub fn new(members: impl IntoIterator<Item = Member>) -> Result<Self, RosterError> {
        let mut map = BTreeMap::new();
        for member in members {
            let id = member.id;
            if map.insert(id, member).is_some() {
                return Err(RosterError::DuplicateMember(id));
            }
        }
        Ok(Self { members: map })
    }

    /// Load both roster files
    ///
    /// # Errors
    ///
    /// Returns [`RosterError`] if a file is missing or unreadable, a line is
    /// malformed, or an id is used twice.
    pub fn from_roster_files(
        students_path: impl AsRef<Path>,
        staff_path: impl AsRef<Path>,
    ) -> Result<Self, RosterError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| RosterError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let students_path = students_path.as_ref();
        let staff_path = staff_path.as_ref();

        let mut members = parse_students(
            &read(students_path)?,
            &students_path.display().to_string(),
        )?;
        members.extend(parse_staff(
            &read(staff_path)?,
            &staff_path.display().to_string(),
        )?);

        let registry = Self::new(members)?;
        tracing::debug!(
            members = registry.len(),
            students = %students_path.display(),
            staff = %staff_path.display(),
            "Loaded rosters"
        );
        Ok(registry)
    }

    /// Find a member by id
    ///
    /// # Errors
    ///
    /// Returns [`GalaError::MemberNotFound`] for an unknown id.
    pub fn lookup(&self, member_id: MemberId) -> Result<&Member, GalaError> {
        self.members
            .get(&member_id)
            .ok_or(GalaError::MemberNotFound { member_id })
    }

    /// Find a member and require a category
    ///
    /// # Errors
    ///
    /// - [`GalaError::MemberNotFound`]: unknown id
    /// - [`GalaError::WrongMemberCategory`]: the id belongs to the other category
    pub fn expect_category(
        &self,
        member_id: MemberId,
        expected: Category,
    ) -> Result<&Member, GalaError> {
        let member = self.lookup(member_id)?;
        let actual = member.category();
        if actual != expected {
            return Err(GalaError::WrongMemberCategory {
                member_id,
                expected,
                actual,
            });
        }
        Ok(member)
    }

    /// Find a student
    ///
    /// # Errors
    ///
    /// See [`MemberRegistry::expect_category`].
    pub fn student(&self, member_id: MemberId) -> Result<&Member, GalaError> {
        self.expect_category(member_id, Category::Student)
    }

    /// Find a staff member
    ///
    /// # Errors
    ///
    /// See [`MemberRegistry::expect_category`].
    pub fn staff(&self, member_id: MemberId) -> Result<&Member, GalaError> {
        self.expect_category(member_id, Category::Staff)
    }

    /// Whether the id is known
    #[must_use]
    pub fn contains(&self, member_id: MemberId) -> bool {
        self.members.contains_key(&member_id)
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }
}

/// Parse a student roster
///
/// # Errors
///
/// Returns [`RosterError::Malformed`] for the first bad line.
pub fn parse_students(text: &str, source_name: &str) -> Result<Vec<Member>, RosterError> {
    parse_lines(text, source_name, 6, |fields, malformed| {
        let year = fields[5]
            .parse::<u8>()
            .ok()
            .and_then(StudyYear::new)
            .ok_or_else(|| malformed(format!("year must be 1 to 5, got {:?}", fields[5])))?;
        Ok(MemberKind::Student { year })
    })
}

/// Parse a staff roster
///
/// # Errors
///
/// Returns [`RosterError::Malformed`] for the first bad line.
pub fn parse_staff(text: &str, source_name: &str) -> Result<Vec<Member>, RosterError> {
    parse_lines(text, source_name, 5, |_, _| Ok(MemberKind::Staff))
}

fn parse_lines<F>(
    text: &str,
    source_name: &str,
    field_count: usize,
    kind: F,
) -> Result<Vec<Member>, RosterError>
where
    F: Fn(&[&str], &dyn Fn(String) -> RosterError) -> Result<MemberKind, RosterError>,
{
    let mut members = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let malformed = |reason: String| RosterError::Malformed {
            source_name: source_name.to_owned(),
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != field_count {
            return Err(malformed(format!(
                "expected {field_count} tab-separated fields, found {}",
                fields.len()
            )));
        }

        let id = fields[0]
            .parse::<u32>()
            .map_err(|_| malformed(format!("invalid member id {:?}", fields[0])))?;
        let kind = kind(&fields, &malformed)?;

        members.push(Member::new(
            MemberId::new(id),
            Contact {
                last_name: fields[1].to_owned(),
                first_name: fields[2].to_owned(),
                phone: fields[3].to_owned(),
                email: fields[4].to_owned(),
            },
            kind,
        ));
    }

    Ok(members)
}
