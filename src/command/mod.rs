pub mod combo;
pub mod help;
pub mod parser;
pub mod shell;

pub use combo::{CombinationCatalog, ComboId, CommandCombo};
pub use parser::{parse, CommandType, ParsedCommand};
pub use shell::{parse_flags, FlagArgs, ShellOutput};
