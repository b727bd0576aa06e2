//! Command names, short aliases and the help listings built from them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ViewRecent,
    ViewLast,
    ViewAll,
    Count,
    Add,
    EditTitle,
    EditText,
    EditTag,
    DelMemo,
    DelAll,
    SearchId,
    SearchDate,
    SearchTitle,
    SearchText,
    SearchTag,
    BackupDb,
    RestoreDb,
    CheckDb,
    RecreateDb,
    Clear,
    Help,
    Quit,
    Group(Group),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    View,
    Edit,
    Del,
    Search,
    Backup,
}

struct Entry {
    command: Command,
    name: &'static str,
    alias: &'static str,
    about: &'static str,
}

const fn entry(
    command: Command,
    name: &'static str,
    alias: &'static str,
    about: &'static str,
) -> Entry {
    Entry { command, name, alias, about }
}

const TABLE: &[Entry] = &[
    entry(Command::ViewRecent, "view-recent", "-vr", "show the newest memo"),
    entry(Command::ViewLast, "view-last", "-vl", "show the five newest memos"),
    entry(Command::ViewAll, "view-all", "-va", "show every memo, oldest first"),
    entry(Command::Count, "count", "-c", "show how many memos are stored"),
    entry(Command::Add, "add", "-a", "write a new memo"),
    entry(Command::EditTitle, "edit-title", "-et", "replace a memo's title"),
    entry(Command::EditText, "edit-text", "-ex", "replace a memo's text"),
    entry(Command::EditTag, "edit-tag", "-eg", "replace a memo's tags"),
    entry(Command::DelMemo, "del-memo", "-dm", "delete one memo"),
    entry(Command::DelAll, "del-all", "-da", "delete every memo"),
    entry(Command::SearchId, "search-id", "-si", "find a memo by identifier"),
    entry(Command::SearchDate, "search-date", "-sd", "find memos by date"),
    entry(Command::SearchTitle, "search-title", "-st", "find memos by title"),
    entry(Command::SearchText, "search-text", "-sx", "find memos by text"),
    entry(Command::SearchTag, "search-tag", "-sg", "find memos by tag"),
    entry(Command::BackupDb, "backup-db", "-bd", "copy the store to its backup"),
    entry(Command::RestoreDb, "restore-db", "-od", "replace the store with its backup"),
    entry(Command::CheckDb, "check-db", "-kd", "run the storage integrity check"),
    entry(Command::RecreateDb, "recreate-db", "-ed", "delete the store and start empty"),
    entry(Command::Clear, "clear", "-r", "delete the store, the backup and the memo pad folder"),
    entry(Command::Help, "help", "-h", "list every command"),
    entry(Command::Quit, "quit", "-q", "offer a backup and exit"),
    entry(Command::Group(Group::View), "view", "-v", "list the view commands"),
    entry(Command::Group(Group::Edit), "edit", "-e", "list the edit commands"),
    entry(Command::Group(Group::Del), "del", "-d", "list the delete commands"),
    entry(Command::Group(Group::Search), "search", "-s", "list the search commands"),
    entry(Command::Group(Group::Backup), "backup", "-b", "list the store maintenance commands"),
];

impl Command {
    /// Match a typed command by name or alias, ignoring case and surrounding spaces.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_lowercase();
        TABLE
            .iter()
            .find(|entry| entry.name == wanted || entry.alias == wanted)
            .map(|entry| entry.command)
    }
}

impl Group {
    fn members(self) -> &'static [Command] {
        match self {
            Self::View => &[Command::ViewRecent, Command::ViewLast, Command::ViewAll, Command::Count],
            Self::Edit => &[Command::EditTitle, Command::EditText, Command::EditTag],
            Self::Del => &[Command::DelMemo, Command::DelAll],
            Self::Search => &[
                Command::SearchId,
                Command::SearchDate,
                Command::SearchTitle,
                Command::SearchText,
                Command::SearchTag,
            ],
            Self::Backup => &[
                Command::BackupDb,
                Command::RestoreDb,
                Command::CheckDb,
                Command::RecreateDb,
                Command::Clear,
            ],
        }
    }
}

fn line(entry: &Entry) -> String {
    format!("  {:<13} {:<4} {}", entry.name, entry.alias, entry.about)
}

/// Every command, one per line.
#[must_use]
pub fn help() -> Vec<String> {
    TABLE.iter().map(line).collect()
}

#[must_use]
pub fn group_help(group: Group) -> Vec<String> {
    let members = group.members();
    TABLE.iter().filter(|entry| members.contains(&entry.command)).map(line).collect()
}
