// Snapshots of program states, for the log file and the round history viewer

use crate::interpreter::constants::LOG_RULE_WIDTH;
use crate::interpreter::engine::ProgramState;

/// Frozen, display-ready copy of one program state
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadSnapshot {
    pub id: usize,
    pub status: String,
    pub finished: bool,
    pub stack: Vec<String>, // Top first
    pub heap: Vec<(u64, String)>,
    pub symbols: Vec<(String, String)>,
    pub output: Vec<String>,
    pub files: Vec<String>,
}

impl ThreadSnapshot {
    /// Freeze the current contents of `state`
    pub fn capture(state: &ProgramState) -> Self {
        ThreadSnapshot {
            id: state.id(),
            status: state.status().to_string(),
            finished: !state.is_active(),
            stack: state.stack().iter().map(|s| s.to_string()).collect(),
            heap: state
                .heap()
                .sorted_entries()
                .into_iter()
                .map(|(address, value)| (address, value.to_string()))
                .collect(),
            symbols: state
                .symbols()
                .sorted_entries()
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            output: state.output().iter().map(|v| v.to_string()).collect(),
            files: state.files().names().into_iter().map(String::from).collect(),
        }
    }

    /// Render the log record for this snapshot under the given timestamp.
    ///
    /// The first line is the timestamp alone; the thread line follows it.
    pub fn render(&self, timestamp: &str) -> String {
        let mut record = format!("{}\nThread {} ({})\n", timestamp, self.id, self.status);

        record.push_str("Execution Stack:\n");
        for stmt in &self.stack {
            record.push_str(stmt);
            record.push('\n');
        }

        record.push_str("Heap:\n");
        for (address, value) in &self.heap {
            record.push_str(&format!("{} -> {}\n", address, value));
        }

        record.push_str("Symbol Table:\n");
        for (name, value) in &self.symbols {
            record.push_str(&format!("{} -> {}\n", name, value));
        }

        record.push_str("Output:\n");
        for line in &self.output {
            record.push_str(line);
            record.push('\n');
        }

        record.push_str(&"-".repeat(LOG_RULE_WIDTH));
        record.push('\n');
        record
    }

    /// Rough memory footprint in bytes
    pub fn estimated_size(&self) -> usize {
        let strings = self.stack.iter().map(String::len).sum::<usize>()
            + self.heap.iter().map(|(_, v)| v.len() + 8).sum::<usize>()
            + self
                .symbols
                .iter()
                .map(|(n, v)| n.len() + v.len())
                .sum::<usize>()
            + self.output.iter().map(String::len).sum::<usize>()
            + self.files.iter().map(String::len).sum::<usize>();
        std::mem::size_of::<Self>() + strings
    }
}

/// Every state as it stood at the end of one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSnapshot {
    pub round: usize,
    pub threads: Vec<ThreadSnapshot>,
}

impl RoundSnapshot {
    pub fn capture(round: usize, states: &[ProgramState]) -> Self {
        RoundSnapshot {
            round,
            threads: states.iter().map(ThreadSnapshot::capture).collect(),
        }
    }

    pub fn estimated_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .threads
                .iter()
                .map(ThreadSnapshot::estimated_size)
                .sum::<usize>()
    }
}

/// Round history with a memory budget
#[derive(Debug)]
pub struct SnapshotManager {
    snapshots: Vec<RoundSnapshot>,
    max_memory: usize,
    current_memory: usize,
}

impl SnapshotManager {
    pub fn new(max_memory: usize) -> Self {
        SnapshotManager {
            snapshots: Vec::new(),
            max_memory,
            current_memory: 0,
        }
    }

    /// Add a snapshot to history
    pub fn push(&mut self, snapshot: RoundSnapshot) -> Result<(), String> {
        let snapshot_size = snapshot.estimated_size();

        if self.current_memory + snapshot_size > self.max_memory {
            return Err(format!(
                "Snapshot memory limit exceeded: {} + {} > {}",
                self.current_memory, snapshot_size, self.max_memory
            ));
        }

        self.current_memory += snapshot_size;
        self.snapshots.push(snapshot);
        Ok(())
    }

    /// Get a snapshot by index
    pub fn get(&self, index: usize) -> Option<&RoundSnapshot> {
        self.snapshots.get(index)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> &[RoundSnapshot] {
        &self.snapshots
    }

    /// Hand the history over, e.g. to the viewer
    pub fn into_snapshots(self) -> Vec<RoundSnapshot> {
        self.snapshots
    }
}
