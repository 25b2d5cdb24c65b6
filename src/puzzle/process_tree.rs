use crate::room::Item;

use super::types::{Difficulty, Hint, Puzzle, PuzzleOutcome, PuzzleRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessStatus {
    Running,
    Sleeping,
    Zombie,
}

impl ProcessStatus {
    fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Running => "running",
            ProcessStatus::Sleeping => "sleeping",
            ProcessStatus::Zombie => "zombie",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Process {
    pub pid: u32,
    pub ppid: u32,
    pub name: &'static str,
    pub status: ProcessStatus,
}

impl Process {
    fn new(pid: u32, ppid: u32, name: &'static str, status: ProcessStatus) -> Self {
        Process {
            pid,
            ppid,
            name,
            status,
        }
    }
}

/// A fixed process table; the player must kill a required set, children first.
#[derive(Debug, Clone)]
pub struct ProcessTree {
    processes: Vec<Process>,
    required: Vec<u32>,
    fork_bomb: u32,
}

impl ProcessTree {
    pub fn table(&self) -> String {
        let mut out = String::from("PID   PPID  STATUS    NAME\n");
        out.push_str("--------------------------------");
        for p in &self.processes {
            out.push_str(&format!(
                "\n{:<6}{:<6}{:<10}{}",
                p.pid, p.ppid, p.status.as_str(), p.name
            ));
        }
        out
    }

    fn is_known(&self, pid: u32) -> bool {
        self.processes.iter().any(|p| p.pid == pid)
    }

    fn children(&self, pid: u32) -> impl Iterator<Item = u32> + '_ {
        self.processes
            .iter()
            .filter(move |p| p.ppid == pid)
            .map(|p| p.pid)
    }

    /// Scan the required pids in kill order: no pid may have one of its
    /// children killed after it.
    fn kill_order_valid(&self, pids: &[u32]) -> bool {
        let relevant: Vec<u32> = pids
            .iter()
            .copied()
            .filter(|pid| self.required.contains(pid))
            .collect();

        relevant.iter().enumerate().all(|(i, &pid)| {
            self.children(pid).all(|child| {
                relevant
                    .iter()
                    .position(|&p| p == child)
                    .map_or(true, |child_index| child_index <= i)
            })
        })
    }

    pub fn validate(&self, input: &str) -> PuzzleOutcome {
        let Some(pids) = parse_kill(input) else {
            return PuzzleOutcome::failed("Invalid command. Use: kill <pid> [pid2] [pid3]", 2);
        };

        if pids == [self.fork_bomb] {
            return PuzzleOutcome::failed(
                "CRITICAL: Killing parent process triggered fork bomb! System corrupting...",
                20,
            );
        }

        if !self.required.iter().all(|pid| pids.contains(pid)) {
            let killed: Vec<String> = pids
                .iter()
                .filter(|pid| self.is_known(**pid))
                .map(u32::to_string)
                .collect();
            return PuzzleOutcome::failed(
                format!(
                    "Killed processes {} but zombies remain active.",
                    killed.join(", ")
                ),
                5,
            );
        }

        if self.kill_order_valid(&pids) {
            PuzzleOutcome::solved(
                "All zombie processes terminated! System stabilizing...",
                -15,
                Item::Kill,
            )
        } else {
            PuzzleOutcome::failed(
                "Processes killed but in wrong order. Fork bomb partially triggered!",
                10,
            )
        }
    }
}

/// Pull the pid list out of `kill <pid...>`. The first run of numbers after
/// the word `kill` counts; anything unparsable yields `None`.
fn parse_kill(input: &str) -> Option<Vec<u32>> {
    let lowered = input.to_lowercase();
    let mut tokens = lowered.split_whitespace().skip_while(|t| *t != "kill");
    tokens.next()?;
    let pids: Vec<u32> = tokens.map_while(|t| t.parse().ok()).collect();
    if pids.is_empty() {
        None
    } else {
        Some(pids)
    }
}

pub fn fork_bomb_defusal() -> Puzzle {
    let processes = vec![
        Process::new(1, 0, "init", ProcessStatus::Running),
        Process::new(1337, 1, "fork_bomb", ProcessStatus::Running),
        Process::new(2048, 1337, "zombie_spawn", ProcessStatus::Zombie),
        Process::new(3047, 2048, "zombie_child", ProcessStatus::Zombie),
        Process::new(666, 1, "daemon", ProcessStatus::Sleeping),
        Process::new(9999, 666, "watcher", ProcessStatus::Running),
    ];

    Puzzle {
        id: "process-tree-1",
        name: "Fork Bomb Defusal",
        description: "Kill the zombie processes in the correct order to prevent a fork bomb",
        difficulty: Difficulty::Hard,
        corruption_modifier: 10,
        hints: vec![
            Hint::free(2, "Kill child processes before their parents"),
            Hint::free(
                4,
                "Zombie processes have living parents that need to reap them",
            ),
            Hint::costly(6, "Process 1337 is the parent of the fork bomb", 5),
            Hint::costly(8, "Kill order: 3047, 2048, then 1337", 10),
        ],
        rule: PuzzleRule::Processes(ProcessTree {
            processes,
            required: vec![3047, 2048, 1337],
            fork_bomb: 1337,
        }),
    }
}
