use std::path::PathBuf;

const DEFAULT_SOURCES_DIR: &str = "sources";
const DEFAULT_SALARY_CSV: &str = "DKSalaries.csv";
const DEFAULT_SECONDARY_SALARY_CSV: &str = "FDraft.csv";
const DEFAULT_OUTPUT: &str = "player_sheet.xlsx";
const DEFAULT_WEEK: usize = 1;
const DEFAULT_SEASON_WEEKS: usize = 16;
const DEFAULT_SEASON: u32 = 2018;
const DEFAULT_SALARY_CAP: f64 = 50_000.0;
const DEFAULT_SECONDARY_SALARY_CAP: f64 = 100_000.0;

/// Settings for one report run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub sources_dir: PathBuf,
    pub salary_csv: PathBuf,
    /// Optional file; a missing file only blanks the secondary salary columns.
    pub secondary_salary_csv: PathBuf,
    pub output: PathBuf,
    /// Most recently completed week, 1-based.
    pub week: usize,
    pub season_weeks: usize,
    pub season: u32,
    pub salary_cap: f64,
    pub secondary_salary_cap: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sources_dir: PathBuf::from(DEFAULT_SOURCES_DIR),
            salary_csv: PathBuf::from(DEFAULT_SALARY_CSV),
            secondary_salary_csv: PathBuf::from(DEFAULT_SECONDARY_SALARY_CSV),
            output: PathBuf::from(DEFAULT_OUTPUT),
            week: DEFAULT_WEEK,
            season_weeks: DEFAULT_SEASON_WEEKS,
            season: DEFAULT_SEASON,
            salary_cap: DEFAULT_SALARY_CAP,
            secondary_salary_cap: DEFAULT_SECONDARY_SALARY_CAP,
        }
    }
}

impl RunConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        for key in [
            "DFS_SOURCES_DIR",
            "DFS_SALARY_CSV",
            "DFS_SECONDARY_SALARY_CSV",
            "DFS_OUTPUT",
            "DFS_WEEK",
            "DFS_SEASON_WEEKS",
            "DFS_SEASON",
            "DFS_SALARY_CAP",
            "DFS_SECONDARY_SALARY_CAP",
        ] {
            if let Some(value) = lookup(key) {
                cfg.set(key, &value);
            }
        }
        cfg.clamp_weeks();
        cfg
    }

    /// Apply `--key=value` / `--key value` overrides. Unknown flags are ignored.
    pub fn apply_args(&mut self, args: &[String]) {
        for (idx, arg) in args.iter().enumerate() {
            let Some(flag) = arg.strip_prefix("--") else {
                continue;
            };
            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (flag, args.get(idx + 1).filter(|next| !next.starts_with("--")).cloned()),
            };
            let Some(value) = value else {
                continue;
            };
            if let Some(key) = env_key_for_flag(name) {
                self.set(key, &value);
            }
        }
        self.clamp_weeks();
    }

    fn set(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        match key {
            "DFS_SOURCES_DIR" => self.sources_dir = PathBuf::from(value),
            "DFS_SALARY_CSV" => self.salary_csv = PathBuf::from(value),
            "DFS_SECONDARY_SALARY_CSV" => self.secondary_salary_csv = PathBuf::from(value),
            "DFS_OUTPUT" => self.output = PathBuf::from(value),
            "DFS_WEEK" => self.week = value.parse().unwrap_or(self.week),
            "DFS_SEASON_WEEKS" => {
                self.season_weeks = value
                    .parse()
                    .ok()
                    .filter(|w| *w > 0)
                    .unwrap_or(self.season_weeks)
            }
            "DFS_SEASON" => self.season = value.parse().unwrap_or(self.season),
            "DFS_SALARY_CAP" => self.salary_cap = parse_cap(value).unwrap_or(self.salary_cap),
            "DFS_SECONDARY_SALARY_CAP" => {
                self.secondary_salary_cap = parse_cap(value).unwrap_or(self.secondary_salary_cap)
            }
            _ => {}
        }
    }

    fn clamp_weeks(&mut self) {
        self.week = self.week.clamp(1, self.season_weeks.max(1));
    }
}

fn env_key_for_flag(flag: &str) -> Option<&'static str> {
    Some(match flag {
        "sources" => "DFS_SOURCES_DIR",
        "salary" => "DFS_SALARY_CSV",
        "secondary-salary" => "DFS_SECONDARY_SALARY_CSV",
        "output" | "out" => "DFS_OUTPUT",
        "week" => "DFS_WEEK",
        "season-weeks" => "DFS_SEASON_WEEKS",
        "season" => "DFS_SEASON",
        "salary-cap" => "DFS_SALARY_CAP",
        "secondary-salary-cap" => "DFS_SECONDARY_SALARY_CAP",
        _ => return None,
    })
}

fn parse_cap(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}
