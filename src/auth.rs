//! Role login with fixed credentials. Not a security boundary.

use crate::error::AuthError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Teacher,
}

/// What a logged-in role may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    GenerateTimetable,
    ViewTimetable,
    ViewTeacherSchedule,
    ExportTeacherSchedule,
    DownloadTimetable,
    ViewTimetableFile,
    ViewTeacherScheduleFile,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::GenerateTimetable => "generate the timetable",
            Action::ViewTimetable => "view the timetable",
            Action::ViewTeacherSchedule => "view teacher schedules",
            Action::ExportTeacherSchedule => "export teacher schedules",
            Action::DownloadTimetable => "download the timetable",
            Action::ViewTimetableFile => "view the saved timetable",
            Action::ViewTeacherScheduleFile => "view saved teacher schedules",
        }
    }
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }

    pub fn dashboard(self) -> &'static [Action] {
        match self {
            Role::Admin => &[
                Action::GenerateTimetable,
                Action::ViewTimetable,
                Action::ViewTeacherSchedule,
                Action::ExportTeacherSchedule,
                Action::DownloadTimetable,
                Action::ViewTimetableFile,
                Action::ViewTeacherScheduleFile,
            ],
            Role::Student => &[Action::ViewTimetableFile],
            Role::Teacher => &[Action::ViewTeacherScheduleFile],
        }
    }

    pub fn can(self, action: Action) -> bool {
        self.dashboard().contains(&action)
    }

    /// Fails with `AuthError::Forbidden` unless `action` is on this role's dashboard.
    pub fn require(self, action: Action) -> Result<(), AuthError> {
        if self.can(action) {
            Ok(())
        } else {
            warn!("{} denied: {}", self.as_str(), action.as_str());
            Err(AuthError::Forbidden {
                role: self.as_str(),
                action: action.as_str(),
            })
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Admin
}

/// Each role logs in with its own name as both username and password.
pub fn authenticate(credentials: &Credentials) -> Result<Role, AuthError> {
    let expected = credentials.role.as_str();
    if credentials.username == expected && credentials.password == expected {
        debug!("authenticated as {}", expected);
        Ok(credentials.role)
    } else {
        warn!("Rejected login for '{}' as {}", credentials.username, expected);
        Err(AuthError::InvalidCredentials)
    }
}
