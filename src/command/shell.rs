//! Simulated shell commands. Nothing here touches the real system; every
//! command renders fixed-shape flavor text that reacts to flags and the room.

use glob::Pattern;
use std::collections::BTreeMap;

use crate::room::{Item, RoomId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagArgs {
    pub flags: Vec<String>,
    pub args: Vec<String>,
}

impl FlagArgs {
    pub fn has(&self, short: &str, long: &str) -> bool {
        self.flags.iter().any(|f| f == short || f == long)
    }
}

/// Split tokens into `-x` style flags and positional arguments.
/// Combined short flags (`-la`) expand to `-l`, `-a`.
pub fn parse_flags<S: AsRef<str>>(tokens: &[S]) -> FlagArgs {
    let mut out = FlagArgs::default();
    for token in tokens {
        let token = token.as_ref();
        if token.starts_with("--") || (token.starts_with('-') && token.chars().count() <= 2) {
            out.flags.push(token.to_string());
        } else if let Some(shorts) = token.strip_prefix('-') {
            out.flags.extend(shorts.chars().map(|c| format!("-{}", c)));
        } else {
            out.args.push(token.to_string());
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellEffects {
    pub flags_to_set: BTreeMap<String, bool>,
    pub corruption_change: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShellOutput {
    pub lines: Vec<String>,
    pub effects: ShellEffects,
}

impl ShellOutput {
    fn lines(lines: Vec<String>) -> Self {
        ShellOutput {
            lines,
            effects: ShellEffects::default(),
        }
    }

    fn text(lines: &[&str]) -> Self {
        Self::lines(lines.iter().map(|s| s.to_string()).collect())
    }

    fn set_flag(mut self, key: &str) -> Self {
        self.effects.flags_to_set.insert(key.to_string(), true);
        self
    }

    fn corruption(mut self, change: i32) -> Self {
        self.effects.corruption_change = change;
        self
    }
}

/// Run one simulated command. `tokens` are everything after the command name.
pub fn execute<S: AsRef<str>>(
    command: Item,
    tokens: &[S],
    room: RoomId,
    puzzle_active: bool,
) -> ShellOutput {
    let parsed = parse_flags(tokens);
    match command {
        Item::Ls => ls(&parsed, room),
        Item::Grep => grep(&parsed),
        Item::Cat => cat(&parsed),
        Item::Echo => echo(&parsed),
        Item::Chmod => chmod(&parsed, puzzle_active),
        Item::Sudo => sudo(&parsed, room),
        Item::Kill => kill(&parsed),
        Item::Pipe => pipe(),
        other => ShellOutput::lines(vec![format!("Executed: {}", other)]),
    }
}

fn ls(p: &FlagArgs, room: RoomId) -> ShellOutput {
    let show_hidden = p.has("-a", "--all");
    let long = p.has("-l", "--long");
    let hidden_path = show_hidden && room == RoomId::FileMaze;

    let mut entries: Vec<(&str, &str)> = vec![
        ("-rw-r--r--  1 user user  256 Jan  1 00:00", "corrupted.txt"),
        ("-rwx------  1 root root  512 Jan  1 00:00", "escape.sh"),
        ("drwxr-xr-x  3 user user 4096 Jan  1 00:00", "memories/"),
    ];
    if show_hidden {
        entries.insert(0, ("drwxr-xr-x  5 root root 4096 Jan  1 00:00", ".."));
        entries.insert(0, ("drwxr-xr-x  2 user user 4096 Jan  1 00:00", "."));
        entries.push(("-rw-------  1 user user  128 Jan  1 00:00", ".secrets"));
        entries.push(("-rw-r--r--  1 user user   64 Jan  1 00:00", ".bash_history"));
        if hidden_path {
            entries.push(("drwx------  2 user user 4096 Jan  1 00:00", ".hidden_path/"));
        }
    }

    let patterns: Vec<Pattern> = p.args.iter().filter_map(|a| Pattern::new(a).ok()).collect();
    if !patterns.is_empty() {
        entries.retain(|(_, name)| patterns.iter().any(|pat| pat.matches(name)));
    }

    let mut lines = vec![String::new()];
    if long {
        lines.push("total 42".to_string());
        lines.extend(entries.iter().map(|(meta, name)| {
            if *name == "escape.sh" {
                format!("{} {} [locked]", meta, name)
            } else {
                format!("{} {}", meta, name)
            }
        }));
    } else {
        for row in entries.chunks(3) {
            let row: Vec<String> = row
                .iter()
                .map(|(_, name)| format!("{:<20}", name))
                .collect();
            lines.push(row.join("  ").trim_end().to_string());
        }
    }

    let out = ShellOutput::lines(lines);
    if hidden_path {
        let mut out = out.set_flag("found_hidden");
        out.lines.push(String::new());
        out.lines.push("[!] Hidden path discovered!".to_string());
        return out;
    }
    out
}

fn grep(p: &FlagArgs) -> ShellOutput {
    let pattern = p.args.first().map(String::as_str).unwrap_or("escape");
    let mut lines = vec![format!("Searching for pattern: \"{}\"...", pattern)];

    if p.has("-r", "--recursive") {
        lines.push("memories/day1.txt:12: I need to escape this loop".to_string());
        lines.push("memories/day5.txt:3: The escape key is broken".to_string());
        lines.push(".secrets:1: escape_sequence=\"^[[ESC\"".to_string());
    } else if let Some(file) = p.args.get(1) {
        lines.push(format!("{}:1: Pattern found in corrupted memory", file));
    } else {
        lines.push("corrupted.txt:42: escape();".to_string());
        lines.push("escape.sh:1: #!/bin/bash".to_string());
    }

    let lowered = pattern.to_lowercase();
    if lowered.contains("escape") || lowered.contains("exit") {
        lines.push(String::new());
        lines.push("[!] Found: /dev/escape -> /freedom".to_string());
        return ShellOutput::lines(lines).set_flag("found_escape");
    }
    ShellOutput::lines(lines)
}

const CORRUPTED_FILE: [&str; 8] = [
    "#!/bin/corrupted",
    "while (trapped) {",
    "  system.decay++;",
    "  memory.leak();",
    "  // TODO: find escape()",
    "}",
    "[CORRUPTED DATA FOLLOWS]",
    "�����������������",
];

fn cat(p: &FlagArgs) -> ShellOutput {
    let filename = p
        .args
        .first()
        .map(String::as_str)
        .unwrap_or("corrupted.txt");
    let show_ends = p.has("-E", "--show-ends");
    let number = p.has("-n", "--number");

    let mut lines = vec![format!("Reading {}...", filename), String::new()];
    for (i, line) in CORRUPTED_FILE.iter().enumerate() {
        let mut out = if number {
            format!("     {:>2}  {}", i + 1, line)
        } else {
            line.to_string()
        };
        if show_ends {
            out.push('$');
        }
        lines.push(out);
    }
    ShellOutput::lines(lines)
}

fn echo(p: &FlagArgs) -> ShellOutput {
    let mut text = p.args.join(" ");
    if p.flags.iter().any(|f| f == "-e") {
        text = text
            .replace("\\n", "\n")
            .replace("\\t", "\t")
            .replace("\\\\", "\\");
    }

    let text = expand_vars(&text);
    let text = if text.is_empty() {
        "Terminal Paradox v0.0.1".to_string()
    } else {
        text
    };
    ShellOutput::lines(text.split('\n').map(str::to_string).collect())
}

fn expand_vars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        while let Some(&n) = chars.peek() {
            if n.is_alphanumeric() || n == '_' {
                name.push(n);
                chars.next();
            } else {
                break;
            }
        }
        let value = match name.as_str() {
            "USER" => Some("trapped_user"),
            "HOME" => Some("/dev/null"),
            "SHELL" => Some("/bin/corrupted"),
            "TERM" => Some("paradox"),
            _ => None,
        };
        match value {
            Some(v) => out.push_str(v),
            None => {
                out.push('$');
                out.push_str(&name);
            }
        }
    }
    out
}

fn chmod(p: &FlagArgs, puzzle_active: bool) -> ShellOutput {
    let mode = p.args.first().map(String::as_str).unwrap_or("755");
    let file = p.args.get(1).map(String::as_str).unwrap_or("escape.sh");

    let mut lines = Vec::new();
    if p.has("-v", "--verbose") {
        lines.push(format!("mode of '{}' changed from 0644 to 0{}", file, mode));
    } else {
        lines.push(format!("Changing permissions of {} to {}...", file, mode));
    }
    if p.has("-R", "--recursive") {
        lines.push("Applying recursively to all subdirectories...".to_string());
    }
    if file == "escape.sh" && matches!(mode, "777" | "755" | "+x") {
        lines.push("[!] escape.sh is now executable!".to_string());
        lines.push("[!] But it seems to need root privileges...".to_string());
    }
    if puzzle_active {
        lines.push("Permissions modified for puzzle environment.".to_string());
    }
    ShellOutput::lines(lines)
}

fn sudo(p: &FlagArgs, room: RoomId) -> ShellOutput {
    if p.has("-l", "--list") {
        return ShellOutput::lines(vec![
            "User trapped_user may run the following commands:".to_string(),
            "    (root) NOPASSWD: /bin/escape.sh".to_string(),
        ]);
    }
    if p.has("-v", "--validate") {
        return ShellOutput::text(&["Password: ", "Sorry, try again."]);
    }

    if room == RoomId::RootVault {
        ShellOutput::text(&[
            "[sudo] password for trapped_user: ********",
            "",
            "AUTHENTICATION SUCCESSFUL!",
            "ROOT ACCESS GRANTED!",
            "",
            "Welcome to the root vault.",
            "With great power comes great responsibility.",
        ])
        .set_flag("has_root")
        .corruption(-50)
    } else {
        ShellOutput::text(&[
            "[sudo] password for trapped_user: ",
            "trapped_user is not in the sudoers file.",
            "This incident will be reported.",
        ])
        .corruption(10)
    }
}

fn kill(p: &FlagArgs) -> ShellOutput {
    if p.has("-l", "--list") {
        return ShellOutput::text(&[
            " 1) SIGHUP     2) SIGINT     3) SIGQUIT    9) SIGKILL",
            "15) SIGTERM   18) SIGCONT   19) SIGSTOP   20) SIGTSTP",
        ]);
    }

    let target = p.args.first().map(String::as_str).unwrap_or("zombies");
    let mut lines = if p.has("-9", "--kill") {
        vec![
            format!("Sending SIGKILL to {}...", target),
            "Process terminated forcefully.".to_string(),
        ]
    } else {
        vec![
            format!("Sending SIGTERM to {}...", target),
            "Process terminated gracefully.".to_string(),
        ]
    };
    lines.push(String::new());
    lines.push("Killing zombie processes...".to_string());
    lines.push("[!] Memory freed: 15MB".to_string());
    ShellOutput::lines(lines).corruption(-15)
}

fn pipe() -> ShellOutput {
    ShellOutput::text(&[
        "Pipe operator activated.",
        "Creating data flow between commands...",
        "",
        "Example pipelines:",
        "  ls -la | grep hidden",
        "  cat file | grep pattern",
        "  echo $USER | cat",
        "",
        "[!] Combine pipe with other commands for powerful effects!",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_flags_expand() {
        let p = parse_flags(&["-la", "--all", "-9", "file.txt"]);
        assert_eq!(p.flags, vec!["-l", "-a", "--all", "-9"]);
        assert_eq!(p.args, vec!["file.txt"]);
    }

    #[test]
    fn ls_hidden_in_maze_sets_flag() {
        let out = execute(Item::Ls, &["-a"], RoomId::FileMaze, false);
        assert_eq!(out.effects.flags_to_set.get("found_hidden"), Some(&true));
        assert!(out.lines.iter().any(|l| l.contains(".hidden_path/")));
        assert_eq!(
            out.lines.last().map(String::as_str),
            Some("[!] Hidden path discovered!")
        );

        let out = execute(Item::Ls, &["-a"], RoomId::BootSequence, false);
        assert!(out.effects.flags_to_set.is_empty());
        assert!(out.lines.iter().any(|l| l.contains(".secrets")));
        assert!(!out.lines.iter().any(|l| l.contains(".hidden_path")));
    }

    #[test]
    fn ls_plain_hides_dotfiles() {
        let out = execute::<&str>(Item::Ls, &[], RoomId::FileMaze, false);
        assert!(!out.lines.iter().any(|l| l.contains(".secrets")));
        assert!(out.lines.iter().any(|l| l.contains("escape.sh")));
    }

    #[test]
    fn ls_long_format() {
        let out = execute(Item::Ls, &["-l"], RoomId::BootSequence, false);
        assert_eq!(out.lines[1], "total 42");
        assert!(out.lines.iter().any(|l| l.ends_with("escape.sh [locked]")));
    }

    #[test]
    fn ls_glob_filters() {
        let out = execute(Item::Ls, &["-l", "*.txt"], RoomId::BootSequence, false);
        let names: Vec<_> = out.lines.iter().skip(2).collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with("corrupted.txt"));
    }

    #[test]
    fn grep_escape_sets_flag() {
        let out = execute(Item::Grep, &["EXIT"], RoomId::FileMaze, false);
        assert_eq!(out.effects.flags_to_set.get("found_escape"), Some(&true));
        assert_eq!(
            out.lines.last().map(String::as_str),
            Some("[!] Found: /dev/escape -> /freedom")
        );

        let out = execute(Item::Grep, &["password"], RoomId::FileMaze, false);
        assert!(out.effects.flags_to_set.is_empty());
    }

    #[test]
    fn cat_numbering_and_ends() {
        let out = execute(Item::Cat, &["-nE"], RoomId::FileMaze, false);
        assert_eq!(out.lines[2], "      1  #!/bin/corrupted$");
    }

    #[test]
    fn echo_expands_vars_and_escapes() {
        let out = execute(Item::Echo, &["-e", "hi\\n$USER"], RoomId::FileMaze, false);
        assert_eq!(out.lines, vec!["hi", "trapped_user"]);

        let out = execute::<&str>(Item::Echo, &[], RoomId::FileMaze, false);
        assert_eq!(out.lines, vec!["Terminal Paradox v0.0.1"]);
    }

    #[test]
    fn echo_variables_are_case_sensitive() {
        let out = execute(Item::Echo, &["$HOME", "$Shell"], RoomId::FileMaze, false);
        assert_eq!(out.lines, vec!["/dev/null $Shell"]);

        let out = execute(Item::Echo, &["$term"], RoomId::FileMaze, false);
        assert_eq!(out.lines, vec!["$term"]);
    }

    #[test]
    fn sudo_depends_on_room() {
        let out = execute::<&str>(Item::Sudo, &[], RoomId::RootVault, false);
        assert_eq!(out.effects.corruption_change, -50);
        assert_eq!(out.effects.flags_to_set.get("has_root"), Some(&true));

        let out = execute::<&str>(Item::Sudo, &[], RoomId::FileMaze, false);
        assert_eq!(out.effects.corruption_change, 10);
        assert!(out.effects.flags_to_set.is_empty());
    }

    #[test]
    fn kill_lists_signals_without_effect() {
        let out = execute(Item::Kill, &["-l"], RoomId::ProcessPrison, false);
        assert_eq!(out.effects.corruption_change, 0);
        let out = execute(Item::Kill, &["-9", "666"], RoomId::ProcessPrison, false);
        assert_eq!(out.lines[0], "Sending SIGKILL to 666...");
        assert_eq!(out.effects.corruption_change, -15);
    }
}
