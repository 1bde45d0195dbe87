use std::fmt;

use crate::model::{GroupId, UserId};
use crate::store::StoreError;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotSignedIn,
    ConfigParseError,
    MissingField,
    InvalidEmail,
    WeakPassword,
    EmptySelection,
    UnknownTask,
    AvatarOutOfRange,
    InvalidWeekday,
    InvalidCredentials,
    EmailInUse,
    ProfileNotFound,
    NoActiveGroup,
    GroupNotFound,
    InviteCodeNotFound,
    NotAMember,
    StoreFailure,
    CorruptDocument,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotSignedIn => "E1001",
            Self::ConfigParseError => "E1002",
            Self::MissingField => "E2001",
            Self::InvalidEmail => "E2002",
            Self::WeakPassword => "E2003",
            Self::EmptySelection => "E2004",
            Self::UnknownTask => "E2005",
            Self::AvatarOutOfRange => "E2006",
            Self::InvalidWeekday => "E2007",
            Self::InvalidCredentials => "E3001",
            Self::EmailInUse => "E3002",
            Self::ProfileNotFound => "E4001",
            Self::NoActiveGroup => "E4002",
            Self::GroupNotFound => "E4003",
            Self::InviteCodeNotFound => "E4004",
            Self::NotAMember => "E4005",
            Self::StoreFailure => "E5001",
            Self::CorruptDocument => "E5002",
        }
    }

    /// Short English summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotSignedIn => "Not signed in",
            Self::ConfigParseError => "Config file parse error",
            Self::MissingField => "Required field missing",
            Self::InvalidEmail => "Invalid email address",
            Self::WeakPassword => "Password too short",
            Self::EmptySelection => "No task selected",
            Self::UnknownTask => "Task not in catalog",
            Self::AvatarOutOfRange => "Avatar index out of range",
            Self::InvalidWeekday => "Invalid weekday",
            Self::InvalidCredentials => "Invalid credentials",
            Self::EmailInUse => "Email already registered",
            Self::ProfileNotFound => "Profile not found",
            Self::NoActiveGroup => "No active group",
            Self::GroupNotFound => "Group not found",
            Self::InviteCodeNotFound => "Invite code not found",
            Self::NotAMember => "Not a member of the group",
            Self::StoreFailure => "Document store failure",
            Self::CorruptDocument => "Stored document is malformed",
        }
    }

    /// User-facing message shown in place of the failed action.
    #[must_use]
    pub const fn localized(self) -> &'static str {
        match self {
            Self::NotSignedIn => "Debes iniciar sesión.",
            Self::ConfigParseError => "El archivo de configuración no es válido.",
            Self::MissingField => "Faltan datos.",
            Self::InvalidEmail => "El correo electrónico no es válido.",
            Self::WeakPassword => "La contraseña debe tener al menos 6 caracteres.",
            Self::EmptySelection => "Selecciona al menos una tarea antes de continuar.",
            Self::UnknownTask => "Esa tarea no está en la lista.",
            Self::AvatarOutOfRange => "Ese avatar no existe.",
            Self::InvalidWeekday => "Día de la semana no válido.",
            Self::InvalidCredentials => "Usuario o contraseña incorrectos",
            Self::EmailInUse => "Ese correo ya está registrado.",
            Self::ProfileNotFound => "No se encontró tu perfil.",
            Self::NoActiveGroup => "No estás en ningún grupo actualmente.",
            Self::GroupNotFound => "El grupo no existe.",
            Self::InviteCodeNotFound => "Código no encontrado",
            Self::NotAMember => "No perteneces a ese grupo.",
            Self::StoreFailure | Self::CorruptDocument => "Ha ocurrido un error. Inténtalo de nuevo.",
        }
    }

    /// Optional remediation hint that can be surfaced next to the error.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotSignedIn => Some("Run `wz login` or `wz signup` first."),
            Self::ConfigParseError => Some("Fix syntax in ~/.config/whizzy/config.toml and retry."),
            Self::MissingField | Self::InvalidEmail | Self::WeakPassword => {
                Some("Correct the input and run the command again.")
            }
            Self::EmptySelection => Some("Pass at least one catalog task id."),
            Self::UnknownTask => Some("List valid ids with `wz tasks catalog`."),
            Self::AvatarOutOfRange => Some("Pick an avatar between 0 and 15."),
            Self::InvalidWeekday => {
                Some("Use one of: Lunes, Martes, Miércoles, Jueves, Viernes, Sábado, Domingo.")
            }
            Self::InvalidCredentials => None,
            Self::EmailInUse => Some("Sign in with `wz login` instead."),
            Self::ProfileNotFound => Some("Run `wz profile setup` to create it."),
            Self::NoActiveGroup => Some("Create one with `wz group create` or join with `wz group join`."),
            Self::GroupNotFound | Self::NotAMember => Some("List your groups with `wz group list`."),
            Self::InviteCodeNotFound => Some("Ask a group member for the current code."),
            Self::StoreFailure => Some("Check that the store file is writable and retry."),
            Self::CorruptDocument => Some("The document was written by an incompatible client."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A required input that was left empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Email,
    Password,
    Name,
    Avatar,
    GroupName,
    WeekStart,
    InviteCode,
}

impl Field {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::Name => "name",
            Self::Avatar => "avatar",
            Self::GroupName => "group_name",
            Self::WeekStart => "week_start",
            Self::InviteCode => "invite_code",
        }
    }

    /// Inline validation text for this field.
    #[must_use]
    pub const fn localized(self) -> &'static str {
        match self {
            Self::Email => "Introduce tu correo electrónico.",
            Self::Password => "Introduce tu contraseña.",
            Self::Name | Self::Avatar => "Debes escribir tu nombre y elegir un avatar.",
            Self::GroupName => "El nombre del grupo es obligatorio.",
            Self::WeekStart => "Debes seleccionar un día de la semana.",
            Self::InviteCode => "Introduce un código de invitación.",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_errors(errors: &[WhizzyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_fields(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Every failure a whizzy operation can surface.
#[derive(Debug, thiserror::Error)]
pub enum WhizzyError {
    #[error("missing required fields: {}", join_fields(.0))]
    MissingFields(Vec<Field>),

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("password must be at least {min} characters")]
    WeakPassword { min: usize },

    #[error("no task selected")]
    EmptySelection,

    #[error("task {0:?} is not in the catalog")]
    UnknownTask(String),

    #[error("avatar index {0} is out of range")]
    AvatarOutOfRange(u32),

    #[error("invalid weekday: {0:?}")]
    InvalidWeekday(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email already registered: {0}")]
    EmailInUse(String),

    #[error("no signed-in user")]
    NotSignedIn,

    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),

    #[error("user {0} has no active group")]
    NoActiveGroup(UserId),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("user {user} is not a member of group {group}")]
    NotAMember { user: UserId, group: GroupId },

    #[error("no group uses invite code {0:?}")]
    InviteCodeNotFound(String),

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Several validation failures found in one form.
    #[error("{}", join_errors(.0))]
    Several(Vec<WhizzyError>),
}

impl WhizzyError {
    /// Fold a list of failures into one error; a single entry is returned as is.
    #[must_use]
    pub fn from_many(errors: Vec<Self>) -> Self {
        match <[Self; 1]>::try_from(errors) {
            Ok([only]) => only,
            Err(errors) => Self::Several(errors),
        }
    }

    /// Machine-readable code associated with this error.
    ///
    /// A [`WhizzyError::Several`] takes the code of its first entry.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingFields(_) => ErrorCode::MissingField,
            Self::InvalidEmail(_) => ErrorCode::InvalidEmail,
            Self::WeakPassword { .. } => ErrorCode::WeakPassword,
            Self::EmptySelection => ErrorCode::EmptySelection,
            Self::UnknownTask(_) => ErrorCode::UnknownTask,
            Self::AvatarOutOfRange(_) => ErrorCode::AvatarOutOfRange,
            Self::InvalidWeekday(_) => ErrorCode::InvalidWeekday,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::EmailInUse(_) => ErrorCode::EmailInUse,
            Self::NotSignedIn => ErrorCode::NotSignedIn,
            Self::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            Self::NoActiveGroup(_) => ErrorCode::NoActiveGroup,
            Self::GroupNotFound(_) => ErrorCode::GroupNotFound,
            Self::NotAMember { .. } => ErrorCode::NotAMember,
            Self::InviteCodeNotFound(_) => ErrorCode::InviteCodeNotFound,
            Self::Config(_) => ErrorCode::ConfigParseError,
            Self::Store(err) => err.code(),
            Self::Several(errors) => errors
                .first()
                .map_or(ErrorCode::MissingField, Self::code),
        }
    }

    /// Localized message for the person who triggered the action.
    ///
    /// Validation failures list one line per missing field; everything else
    /// uses the message attached to its [`ErrorCode`].
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(fields) => {
                let mut lines: Vec<&str> = Vec::with_capacity(fields.len());
                for field in fields {
                    let line = field.localized();
                    if !lines.contains(&line) {
                        lines.push(line);
                    }
                }
                lines.join("\n")
            }
            Self::Several(errors) => {
                let mut lines: Vec<String> = Vec::new();
                for err in errors {
                    for line in err.user_message().lines() {
                        if !lines.iter().any(|seen| seen == line) {
                            lines.push(line.to_string());
                        }
                    }
                }
                lines.join("\n")
            }
            other => other.code().localized().to_string(),
        }
    }

    /// True for failures detected locally, before any store call.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        match self {
            Self::Several(errors) => errors.iter().all(Self::is_validation),
            other => matches!(
                other,
                Self::MissingFields(_)
                    | Self::InvalidEmail(_)
                    | Self::WeakPassword { .. }
                    | Self::EmptySelection
                    | Self::UnknownTask(_)
                    | Self::AvatarOutOfRange(_)
                    | Self::InvalidWeekday(_)
            ),
        }
    }
}

pub type Result<T, E = WhizzyError> = std::result::Result<T, E>;
