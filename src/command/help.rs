use crate::room::Item;

struct ManPage {
    name: &'static str,
    summary: &'static str,
    usage: &'static str,
    examples: &'static [&'static str],
    tips: &'static [&'static str],
}

fn man_page(item: Item) -> Option<ManPage> {
    let page = match item {
        Item::Ls => ManPage {
            name: "ls (list)",
            summary: "Lists files and directories in the current location",
            usage: "ls [options] [pattern]",
            examples: &[
                "ls          → List current directory",
                "ls -a       → Show hidden files (starting with .)",
                "ls -l       → Long format with details",
                "ls -la      → Show all files in long format",
                "ls *.txt    → Only entries matching a pattern",
            ],
            tips: &[
                "• Hidden files start with a dot (.secrets, .hidden_path)",
                "• Finding hidden paths may reveal secrets!",
            ],
        },
        Item::Grep => ManPage {
            name: "grep (global regular expression print)",
            summary: "Searches for patterns in files or text",
            usage: "grep [options] [pattern] [file]",
            examples: &[
                "grep escape        → Search for \"escape\" patterns",
                "grep -r pattern    → Search recursively in all files",
                "grep exit          → May reveal hidden paths",
            ],
            tips: &["• Searching for \"escape\" or \"exit\" might help!"],
        },
        Item::Chmod => ManPage {
            name: "chmod (change mode)",
            summary: "Changes file permissions (who can read/write/execute)",
            usage: "chmod [options] [mode] [file]",
            examples: &[
                "chmod +x escape.sh  → Make file executable",
                "chmod 755 file      → rwx for owner, rx for others",
                "chmod -v 777 file   → Verbose mode, full permissions",
            ],
            tips: &[
                "• r=4, w=2, x=1; add them per owner/group/other",
                "• A locked permission puzzle accepts chmod <mode>",
            ],
        },
        Item::Sudo => ManPage {
            name: "sudo (superuser do)",
            summary: "Runs commands with administrator/root privileges",
            usage: "sudo [options]",
            examples: &[
                "sudo            → Request root access",
                "sudo -l         → List allowed commands",
                "sudo -v         → Validate credentials",
            ],
            tips: &["• May only work in specific locations", "• Root access is key to escaping"],
        },
        Item::Cat => ManPage {
            name: "cat (concatenate)",
            summary: "Displays file contents",
            usage: "cat [options] [file]",
            examples: &[
                "cat corrupted.txt  → Display file contents",
                "cat -n file        → Show with line numbers",
                "cat -E file        → Show line endings with $",
            ],
            tips: &["• Some files might contain clues!"],
        },
        Item::Echo => ManPage {
            name: "echo",
            summary: "Prints text to the terminal",
            usage: "echo [options] [text]",
            examples: &[
                "echo hello       → Print text",
                "echo $USER       → Print environment variable",
                "echo -e a\\nb     → Enable escape sequences",
            ],
            tips: &["• $USER, $HOME, $SHELL and $TERM show system info"],
        },
        Item::Pipe => ManPage {
            name: "pipe ( | )",
            summary: "Sends output from one command as input to another",
            usage: "combine <command> with <command>",
            examples: &["combine ls with grep  → Deep search"],
            tips: &["• Combines simple tools into powerful workflows"],
        },
        Item::Kill => ManPage {
            name: "kill",
            summary: "Terminates running processes",
            usage: "kill [options] [pid...]",
            examples: &[
                "kill 666        → Terminate a process",
                "kill -9 666     → Force kill (SIGKILL)",
                "kill -l         → List available signals",
            ],
            tips: &["• Children die before their parents", "• Killing zombies reduces corruption"],
        },
        Item::Ps | Item::Free | Item::Malloc => return None,
    };
    Some(page)
}

const RULE: &str = "═══════════════════════════════════════════════════";

/// Manual page for one command item.
pub fn command_help(item: Item) -> Vec<String> {
    let Some(page) = man_page(item) else {
        return vec![format!("No help available for '{}'", item)];
    };

    let mut out = vec![
        RULE.to_string(),
        page.name.to_uppercase(),
        RULE.to_string(),
        String::new(),
        page.summary.to_string(),
        String::new(),
        "USAGE:".to_string(),
        format!("  {}", page.usage),
        String::new(),
        "EXAMPLES:".to_string(),
    ];
    out.extend(page.examples.iter().map(|e| format!("  {}", e)));
    out.push(String::new());
    out.push("TIPS:".to_string());
    out.extend(page.tips.iter().map(|t| format!("  {}", t)));
    out.push(RULE.to_string());
    out
}

pub fn quick_help(item: Item) -> String {
    man_page(item)
        .map(|p| p.summary.to_string())
        .unwrap_or_else(|| format!("Command '{}'", item))
}

pub const GENERAL_HELP: &str = "\
AVAILABLE COMMANDS:
===================
Movement:
  go/move <direction>    - Move in a direction
  n/s/e/w/up/down        - Quick movement

Items:
  take/get <item>        - Pick up an item
  drop <item>            - Drop an item from inventory
  use <item> [args]      - Use an item
  combine <X> with <Y>   - Combine two items
  <item> [flags] [args]  - Run a command you carry (ls -la, grep exit)
  man <item>             - Read a command's manual

Puzzles:
  solve <answer>         - Answer the puzzle in this room
  hint                   - Ask for a hint (may cost corruption)
  puzzles                - Show puzzle progress

Information:
  look/l                 - Look around the room
  examine <target>       - Examine something closely
  inventory/i            - Check your inventory
  combos                 - List discovered combinations
  help/?                 - Show this help

Game:
  save / load / reset / quit

TIPS:
- Some commands can be corrupted and may not work as expected
- Combine commands creatively to solve puzzles
- Pay attention to error messages - they might be clues";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_command_has_a_page() {
        for item in Item::COMMANDS {
            let page = command_help(item);
            assert!(page.len() > 8, "{item}");
            assert!(!quick_help(item).starts_with("Command '"));
        }
    }

    #[test]
    fn auxiliary_items_have_no_page() {
        assert_eq!(command_help(Item::Ps), vec!["No help available for 'ps'"]);
        assert_eq!(quick_help(Item::Malloc), "Command 'malloc'");
    }
}
