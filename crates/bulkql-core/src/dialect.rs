//! Insert dialect capabilities
//!
//! Each database engine expresses multi-row inserts, duplicate handling and
//! key returning differently. Dialects describe those differences as
//! capabilities; the statement builder asks for a capability and never
//! branches on which engine it is talking to.

use std::fmt;

/// How bound parameters are written into SQL text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` for every parameter (MySQL, SQLite, generic)
    QuestionMark,
    /// `$1`, `$2`, ... (PostgreSQL)
    DollarNumbered,
}

/// Where a dialect puts its "skip conflicting rows" syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreStyle {
    /// Keyword between `INSERT` and `INTO` (e.g. `IGNORE`, `OR IGNORE`)
    InsertModifier(&'static str),
    /// Clause appended after the VALUES list (e.g. `ON CONFLICT DO NOTHING`)
    ConflictClause(&'static str),
}

/// How a dialect expresses update-on-duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// `ON DUPLICATE KEY UPDATE`; the engine picks the violated unique key,
    /// so a boolean flag is enough
    DuplicateKeyUpdate,
    /// `ON CONFLICT (<target>) DO UPDATE SET`; needs an explicit list of
    /// conflict target columns
    OnConflictUpdate,
}

impl UpsertStyle {
    /// Whether the dialect needs an explicit conflict target
    pub fn requires_conflict_target(&self) -> bool {
        matches!(self, UpsertStyle::OnConflictUpdate)
    }
}

/// Snapshot of what a dialect can do, for logging and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectCapabilities {
    pub supports_ignore: bool,
    pub supports_update_on_duplicate: bool,
    pub requires_conflict_target: bool,
    pub supports_returning: bool,
    pub supports_default_keyword: bool,
    pub max_bind_parameters: Option<usize>,
}

/// SQL syntax capabilities of one database engine for batched inserts
pub trait InsertDialect: Send + Sync + fmt::Debug {
    /// Dialect identifier (e.g., "postgres", "sqlite")
    fn id(&self) -> &'static str;

    /// Display name
    fn display_name(&self) -> &'static str;

    /// Identifier quote character (e.g., '"' for SQL standard, '`' for MySQL)
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quote an identifier, doubling any embedded quote character
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let mut escaped = String::with_capacity(name.len() + 2);
        escaped.push(quote);
        for ch in name.chars() {
            if ch == quote {
                escaped.push(quote);
            }
            escaped.push(ch);
        }
        escaped.push(quote);
        escaped
    }

    fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::QuestionMark
    }

    /// Placeholder for the parameter at 1-based `position`
    fn placeholder(&self, position: usize) -> String {
        match self.placeholder_style() {
            PlaceholderStyle::QuestionMark => "?".to_string(),
            PlaceholderStyle::DollarNumbered => format!("${}", position),
        }
    }

    fn ignore_style(&self) -> Option<IgnoreStyle> {
        None
    }

    fn upsert_style(&self) -> Option<UpsertStyle> {
        None
    }

    /// Whether `INSERT ... RETURNING <key>` is available
    fn supports_returning(&self) -> bool {
        false
    }

    /// Whether the `DEFAULT` keyword may stand in for a value inside VALUES
    fn supports_default_keyword(&self) -> bool {
        false
    }

    /// Largest number of bound parameters one statement may carry
    fn max_bind_parameters(&self) -> Option<usize> {
        None
    }

    fn supports_ignore(&self) -> bool {
        self.ignore_style().is_some()
    }

    fn supports_update_on_duplicate(&self) -> bool {
        self.upsert_style().is_some()
    }

    /// Render the upsert clause, or None when the dialect has no upsert.
    ///
    /// `conflict_target` is ignored by `DuplicateKeyUpdate` dialects.
    fn render_upsert(&self, conflict_target: &[String], update_columns: &[String]) -> Option<String> {
        let style = self.upsert_style()?;
        let clause = match style {
            UpsertStyle::DuplicateKeyUpdate => {
                let assignments = update_columns
                    .iter()
                    .map(|c| {
                        let quoted = self.quote_identifier(c);
                        format!("{}=VALUES({})", quoted, quoted)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("ON DUPLICATE KEY UPDATE {}", assignments)
            }
            UpsertStyle::OnConflictUpdate => {
                let target = conflict_target
                    .iter()
                    .map(|c| self.quote_identifier(c))
                    .collect::<Vec<_>>()
                    .join(", ");
                let assignments = update_columns
                    .iter()
                    .map(|c| {
                        let quoted = self.quote_identifier(c);
                        format!("{}=EXCLUDED.{}", quoted, quoted)
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("ON CONFLICT ({}) DO UPDATE SET {}", target, assignments)
            }
        };
        Some(clause)
    }

    /// Render the returning clause for `key_column`, or None when unsupported
    fn render_returning(&self, key_column: &str) -> Option<String> {
        self.supports_returning()
            .then(|| format!("RETURNING {}", self.quote_identifier(key_column)))
    }

    fn capabilities(&self) -> DialectCapabilities {
        DialectCapabilities {
            supports_ignore: self.supports_ignore(),
            supports_update_on_duplicate: self.supports_update_on_duplicate(),
            requires_conflict_target: self
                .upsert_style()
                .is_some_and(|s| s.requires_conflict_target()),
            supports_returning: self.supports_returning(),
            supports_default_keyword: self.supports_default_keyword(),
            max_bind_parameters: self.max_bind_parameters(),
        }
    }
}
