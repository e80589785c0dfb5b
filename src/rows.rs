use crate::player::{Position, PositionDetail, RankedPlayer, Usage, format_percent};

/// One rendered cell. Renderers pick number formats from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Integer(i64),
    /// Fraction, rendered as a percentage.
    Percent(f64),
    Currency(f64),
    Blank,
}

impl Cell {
    fn number(value: Option<f64>) -> Cell {
        value.map(Cell::Number).unwrap_or(Cell::Blank)
    }

    fn percent(value: Option<f64>) -> Cell {
        value.map(Cell::Percent).unwrap_or(Cell::Blank)
    }

    fn rank(value: Option<u32>) -> Cell {
        value.map(|v| Cell::Integer(i64::from(v))).unwrap_or(Cell::Blank)
    }

    /// Plain text rendering, as a spreadsheet would display it.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => format_number(*v),
            Cell::Integer(v) => v.to_string(),
            Cell::Percent(v) => format_percent(*v),
            Cell::Currency(v) => format_currency(*v),
            Cell::Blank => String::new(),
        }
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        let text = format!("{v:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn format_currency(v: f64) -> String {
    let whole = v.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

const PREFIX: [&str; 7] = ["Position", "Name", "Opp", "Abbv", "Total", "O/U", "Line"];

const SUFFIX: [&str; 11] = [
    "Ave PPG",
    "ECR",
    "+/- Rank",
    "Salary",
    "Salary%",
    "FD Salary",
    "FD Salary%",
    "FD +/- Rank",
    "ECR Data",
    "Salary Rank",
    "FDraft Salary Rank",
];

/// Helper columns the sheet keeps but hides.
pub const HIDDEN_COLUMNS: [&str; 4] = ["Abbv", "ECR Data", "Salary Rank", "FDraft Salary Rank"];

const QB_BLOCK: [&str; 9] = [
    "Rush Yards",
    "DYAR",
    "QBR",
    "O-Line Sack%",
    "D-Line Sack%",
    "Pass DVOA",
    "Def Yds/Att",
    "Def Comp%",
    "Def TD%",
];
const RB_BLOCK: [&str; 4] = ["Run DVOA", "Pass DVOA", "O-Line", "D-Line"];
const RB_USAGE: [&str; 4] = ["Snap%", "Rush ATTs", "Trgts", "RZ Opps"];
const WR_BLOCK: [&str; 3] = ["Pass DVOA", "vs. WR1", "vs. WR2"];
const TE_BLOCK: [&str; 2] = ["Pass DVOA", "vs. TE"];
const RECEIVER_USAGE: [&str; 4] = ["Snap%", "Trgts", "Rcpts", "RZ Opps"];

/// Column names for a position's sheet. Usage columns appear twice: season
/// average, then last week.
pub fn header(position: Position) -> Vec<&'static str> {
    let block: Vec<&'static str> = match position {
        Position::QB => QB_BLOCK.to_vec(),
        Position::RB => [&RB_BLOCK[..], &RB_USAGE[..], &RB_USAGE[..]].concat(),
        Position::WR => [&WR_BLOCK[..], &RECEIVER_USAGE[..], &RECEIVER_USAGE[..]].concat(),
        Position::TE => [&TE_BLOCK[..], &RECEIVER_USAGE[..], &RECEIVER_USAGE[..]].concat(),
        Position::DST => Vec::new(),
    };
    [&PREFIX[..], &block[..], &SUFFIX[..]].concat()
}

/// Cells for one ranked player, aligned with [`header`] for its position.
pub fn row(player: &RankedPlayer) -> Vec<Cell> {
    let base = player.record.base();
    let ranks = &player.ranks;
    let secondary = base.secondary_salary;

    let mut cells = vec![
        Cell::Text(player.record.position().to_string()),
        Cell::Text(base.display_name.clone()),
        Cell::Text(base.matchup.opp_display.clone()),
        Cell::Text(base.team_abbv.clone()),
        Cell::number(base.vegas.projected),
        Cell::number(base.vegas.over_under),
        Cell::number(base.vegas.line),
    ];
    cells.extend(position_block(player.record.detail()));
    cells.extend([
        Cell::number(base.average_ppg),
        Cell::Integer(i64::from(ranks.ecr_rank)),
        Cell::Integer(ranks.value_diff),
        Cell::Currency(f64::from(base.salary)),
        Cell::Percent(base.salary_fraction),
        secondary
            .map(|s| Cell::Currency(f64::from(s.salary)))
            .unwrap_or(Cell::Blank),
        Cell::percent(secondary.map(|s| s.fraction)),
        ranks
            .secondary_value_diff
            .map(Cell::Integer)
            .unwrap_or(Cell::Blank),
        Cell::Integer(i64::from(base.ecr.rank)),
        Cell::Integer(i64::from(ranks.salary_rank)),
        Cell::rank(ranks.secondary_salary_rank),
    ]);
    cells
}

fn position_block(detail: &PositionDetail) -> Vec<Cell> {
    match detail {
        PositionDetail::Qb(qb) => vec![
            Cell::number(qb.rush_yds),
            Cell::number(qb.pass_dyar),
            Cell::number(qb.qbr),
            Cell::percent(qb.oline_sack_rate),
            Cell::percent(qb.opp_dline_sack_rate),
            Cell::rank(qb.opp_pass_def_rank),
            Cell::number(qb.opp_yds_per_att),
            Cell::percent(qb.opp_comp_pct),
            Cell::percent(qb.opp_td_pct),
        ],
        PositionDetail::Rb(rb) => {
            let mut cells = vec![
                Cell::rank(rb.opp_run_def_rank),
                Cell::rank(rb.opp_rb_pass_def_rank),
                Cell::number(rb.oline_adj_line_yds),
                Cell::number(rb.opp_dline_adj_line_yds),
            ];
            for usage in [&rb.season, &rb.last_week] {
                cells.extend(rusher_usage(usage));
            }
            cells
        }
        PositionDetail::Wr(wr) => {
            let mut cells = vec![
                Cell::rank(wr.opp_pass_def_rank),
                Cell::rank(wr.opp_wr1_rank),
                Cell::rank(wr.opp_wr2_rank),
            ];
            for usage in [&wr.season, &wr.last_week] {
                cells.extend(receiver_usage(usage));
            }
            cells
        }
        PositionDetail::Te(te) => {
            let mut cells = vec![Cell::rank(te.opp_pass_def_rank), Cell::rank(te.opp_te_rank)];
            for usage in [&te.season, &te.last_week] {
                cells.extend(receiver_usage(usage));
            }
            cells
        }
        PositionDetail::Dst => Vec::new(),
    }
}

// Snap share is published in percent units, not as a fraction.
fn rusher_usage(usage: &Usage) -> [Cell; 4] {
    [
        Cell::number(usage.snap_pct),
        Cell::number(usage.rush_atts),
        Cell::number(usage.targets),
        Cell::Number(usage.red_zone_opps),
    ]
}

fn receiver_usage(usage: &Usage) -> [Cell; 4] {
    [
        Cell::number(usage.snap_pct),
        Cell::number(usage.targets),
        Cell::number(usage.receptions),
        Cell::Number(usage.red_zone_opps),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layouts_per_position() {
        assert_eq!(header(Position::DST).len(), 18);
        assert_eq!(header(Position::QB).len(), 27);
        assert_eq!(header(Position::RB).len(), 30);
        assert_eq!(header(Position::WR).len(), 29);
        assert_eq!(header(Position::TE).len(), 28);
        let te = header(Position::TE);
        assert_eq!(&te[7..10], &["Pass DVOA", "vs. TE", "Snap%"]);
    }

    #[test]
    fn text_rendering_matches_sheet_display() {
        assert_eq!(Cell::Currency(8600.0).to_text(), "$8,600");
        assert_eq!(Cell::Currency(15_800.0).to_text(), "$15,800");
        assert_eq!(Cell::Currency(900.0).to_text(), "$900");
        assert_eq!(Cell::Percent(0.172).to_text(), "17.2%");
        assert_eq!(Cell::Number(4.5).to_text(), "4.5");
        assert_eq!(Cell::Number(3.0).to_text(), "3");
        assert_eq!(Cell::Blank.to_text(), "");
    }
}
