//! Reward history table with client-side filtering

use crate::i18n::{format_date, Translate};
use chill_core::{Error, Points, RewardTransaction, TransactionStatus, TransactionType};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Transaction-type filter offered by the table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Earn,
    Redeem,
    Transfer,
}

impl TypeFilter {
    pub fn matches(&self, kind: TransactionType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Earn => kind == TransactionType::Earn,
            TypeFilter::Redeem => kind == TransactionType::Redeem,
            TypeFilter::Transfer => kind == TransactionType::Transfer,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TypeFilter::All),
            "earn" => Ok(TypeFilter::Earn),
            "redeem" => Ok(TypeFilter::Redeem),
            "transfer" => Ok(TypeFilter::Transfer),
            other => Err(Error::InvalidData(format!(
                "unknown transaction type filter '{}'",
                other
            ))),
        }
    }
}

/// Local filter state of the table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub kind: TypeFilter,
    pub search: String,
}

impl HistoryFilter {
    pub fn matches(&self, tx: &RewardTransaction) -> bool {
        if !self.kind.matches(tx.transaction_type) {
            return false;
        }
        let needle = self.search.to_lowercase();
        needle.is_empty() || tx.description.to_lowercase().contains(&needle)
    }
}

/// Filter a transaction list, preserving server order
pub fn filter_transactions<'a>(
    transactions: &'a [RewardTransaction],
    filter: &HistoryFilter,
) -> Vec<&'a RewardTransaction> {
    transactions.iter().filter(|tx| filter.matches(tx)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn arrow(&self) -> &'static str {
        match self {
            Direction::Up => "↑",
            Direction::Down => "↓",
        }
    }
}

/// One rendered table row
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub id: String,
    pub date: String,
    pub description: String,
    pub points: Points,
    pub points_label: String,
    pub direction: Direction,
    pub transaction_type: TransactionType,
    pub type_label: String,
    pub status: TransactionStatus,
    pub status_label: String,
}

impl HistoryRow {
    pub fn from_transaction<T: Translate + ?Sized>(tx: &RewardTransaction, t: &T) -> Self {
        let points = Points::for_transaction(tx.points, tx.transaction_type);
        let direction = if tx.transaction_type.is_credit() {
            Direction::Up
        } else {
            Direction::Down
        };

        Self {
            id: tx.id.clone(),
            date: format_date(&tx.created_at, t.locale()),
            description: tx.description.clone(),
            points_label: points.signed_display(),
            points,
            direction,
            transaction_type: tx.transaction_type,
            type_label: type_label(tx.transaction_type, t),
            status: tx.status,
            status_label: status_label(tx.status, t),
        }
    }
}

fn type_label<T: Translate + ?Sized>(kind: TransactionType, t: &T) -> String {
    let default = match kind {
        TransactionType::Earn => "Earned",
        TransactionType::Redeem => "Redeemed",
        TransactionType::Transfer => "Transferred",
        TransactionType::Expire => "Expired",
    };
    t.t(&format!("rewards.history.type.{}", kind.as_str()), default, &[])
}

fn status_label<T: Translate + ?Sized>(status: TransactionStatus, t: &T) -> String {
    let default = match status {
        TransactionStatus::Active => "Active",
        TransactionStatus::Used => "Used",
        TransactionStatus::Expired => "Expired",
        TransactionStatus::Cancelled => "Cancelled",
    };
    t.t(&format!("rewards.history.status.{}", status.as_str()), default, &[])
}

/// Credit and debit totals over a set of rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub count: usize,
    pub credited: i64,
    pub debited: i64,
}

/// Filtered subset remembered for one (transactions, filter) pair
struct Memo {
    source: Arc<Vec<RewardTransaction>>,
    filter: HistoryFilter,
    indices: Vec<usize>,
}

/// History table state: the filter plus a memoized filtered view
#[derive(Default)]
pub struct RewardHistoryTable {
    filter: HistoryFilter,
    memo: Option<Memo>,
    recomputations: usize,
}

impl RewardHistoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &HistoryFilter {
        &self.filter
    }

    pub fn set_type(&mut self, kind: TypeFilter) {
        self.filter.kind = kind;
    }

    pub fn set_search(&mut self, search: &str) {
        self.filter.search = search.to_string();
    }

    pub fn reset_filters(&mut self) {
        self.filter = HistoryFilter::default();
    }

    /// Number of times the filtered view was actually recomputed
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Positions of matching transactions, recomputed only when the list
    /// or the filter changed since the last call
    fn filtered_indices(&mut self, transactions: &Arc<Vec<RewardTransaction>>) -> &[usize] {
        let fresh = self.memo.as_ref().is_some_and(|memo| {
            Arc::ptr_eq(&memo.source, transactions) && memo.filter == self.filter
        });

        if !fresh {
            let indices = transactions
                .iter()
                .enumerate()
                .filter(|(_, tx)| self.filter.matches(tx))
                .map(|(i, _)| i)
                .collect::<Vec<_>>();
            debug!(
                "History filter {:?} matched {} of {} transactions",
                self.filter,
                indices.len(),
                transactions.len()
            );
            self.recomputations += 1;
            self.memo = Some(Memo {
                source: transactions.clone(),
                filter: self.filter.clone(),
                indices,
            });
        }

        self.memo
            .as_ref()
            .map(|memo| memo.indices.as_slice())
            .unwrap_or_default()
    }

    /// Transactions passing the current filter
    pub fn filtered<'a>(
        &mut self,
        transactions: &'a Arc<Vec<RewardTransaction>>,
    ) -> Vec<&'a RewardTransaction> {
        self.filtered_indices(transactions)
            .iter()
            .filter_map(|&i| transactions.get(i))
            .collect()
    }

    /// Rendered rows for the current filter
    pub fn rows<T: Translate + ?Sized>(
        &mut self,
        transactions: &Arc<Vec<RewardTransaction>>,
        t: &T,
    ) -> Vec<HistoryRow> {
        self.filtered(transactions)
            .into_iter()
            .map(|tx| HistoryRow::from_transaction(tx, t))
            .collect()
    }

    pub fn summary(rows: &[HistoryRow]) -> HistorySummary {
        rows.iter().fold(HistorySummary::default(), |mut acc, row| {
            acc.count += 1;
            match row.direction {
                Direction::Up => acc.credited += row.points.as_i64(),
                Direction::Down => acc.debited += row.points.as_i64().abs(),
            }
            acc
        })
    }

    /// Plain-text table for terminals
    pub fn to_text<T: Translate + ?Sized>(rows: &[HistoryRow], t: &T) -> String {
        if rows.is_empty() {
            return t.t("rewards.history.empty", "No transactions found", &[]);
        }

        let header = format!(
            "{:<14} {:<12} {:>10}  {:<10} {}",
            t.t("rewards.history.date", "Date", &[]),
            t.t("rewards.history.type", "Type", &[]),
            t.t("rewards.history.points", "Points", &[]),
            t.t("rewards.history.status", "Status", &[]),
            t.t("rewards.history.description", "Description", &[]),
        );

        let mut lines = vec![header];
        lines.extend(rows.iter().map(|row| {
            format!(
                "{:<14} {:<12} {:>8} {}  {:<10} {}",
                row.date,
                row.type_label,
                row.points_label,
                row.direction.arrow(),
                row.status_label,
                row.description
            )
        }));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use chrono::{TimeZone, Utc};

    fn tx(id: &str, points: i64, kind: TransactionType, description: &str) -> RewardTransaction {
        RewardTransaction {
            id: id.to_string(),
            user_id: "u-1".to_string(),
            points,
            description: description.to_string(),
            transaction_type: kind,
            booking_id: None,
            recipient_id: None,
            expiry_date: None,
            status: TransactionStatus::Active,
            created_at: Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap(),
        }
    }

    fn sample() -> Arc<Vec<RewardTransaction>> {
        Arc::new(vec![
            tx("1", 100, TransactionType::Earn, "Stay at Lakeside Cabin"),
            tx("2", 50, TransactionType::Redeem, "Spa voucher"),
            tx("3", 30, TransactionType::Transfer, "Gift from Sam"),
            tx("4", 20, TransactionType::Expire, "Points expired"),
            tx("5", 400, TransactionType::Earn, "Stay at SEASIDE villa"),
        ])
    }

    #[test]
    fn test_type_filter_is_exact() {
        let list = sample();
        let filter = HistoryFilter {
            kind: TypeFilter::Earn,
            search: String::new(),
        };
        let result = filter_transactions(&list, &filter);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|t| t.transaction_type == TransactionType::Earn));
    }

    #[test]
    fn test_redeem_scenario() {
        let list = vec![
            tx("1", 100, TransactionType::Earn, "Booking"),
            tx("2", 50, TransactionType::Redeem, "Voucher"),
        ];
        let filter = HistoryFilter {
            kind: TypeFilter::Redeem,
            search: String::new(),
        };
        let ids: Vec<&str> = filter_transactions(&list, &filter)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let list = sample();
        let filter = HistoryFilter {
            kind: TypeFilter::All,
            search: "sTaY aT".to_string(),
        };
        let result = filter_transactions(&list, &filter);
        let ids: Vec<&str> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "5"]);
        for t in &list[..] {
            let contains = t.description.to_lowercase().contains("stay at");
            assert_eq!(contains, ids.contains(&t.id.as_str()));
        }
    }

    #[test]
    fn test_all_with_empty_search_keeps_order() {
        let list = sample();
        let result = filter_transactions(&list, &HistoryFilter::default());
        let ids: Vec<&str> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_row_sign_convention() {
        let list = sample();
        let mut table = RewardHistoryTable::new();
        let rows = table.rows(&list, &Catalog::default());

        let labels: Vec<(&str, Direction)> = rows
            .iter()
            .map(|r| (r.points_label.as_str(), r.direction))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("+100", Direction::Up),
                ("-50", Direction::Down),
                ("+30", Direction::Up),
                ("-20", Direction::Down),
                ("+400", Direction::Up),
            ]
        );
        assert_eq!(rows[1].type_label, "Redeemed");
        assert_eq!(rows[0].date, "Apr 2, 2026");
    }

    #[test]
    fn test_memoized_until_inputs_change() {
        let list = sample();
        let mut table = RewardHistoryTable::new();

        table.filtered(&list);
        table.filtered(&list);
        assert_eq!(table.recomputations(), 1);

        table.set_type(TypeFilter::Redeem);
        assert_eq!(table.filtered(&list).len(), 1);
        assert_eq!(table.recomputations(), 2);

        let refetched = Arc::new((*list).clone());
        table.filtered(&refetched);
        assert_eq!(table.recomputations(), 3);

        table.set_type(TypeFilter::Redeem);
        table.filtered(&refetched);
        assert_eq!(table.recomputations(), 3);

        table.reset_filters();
        assert_eq!(table.filtered(&refetched).len(), 5);
    }

    #[test]
    fn test_summary_and_text() {
        let list = sample();
        let mut table = RewardHistoryTable::new();
        let catalog = Catalog::default();
        let rows = table.rows(&list, &catalog);

        let summary = RewardHistoryTable::summary(&rows);
        assert_eq!(summary.count, 5);
        assert_eq!(summary.credited, 530);
        assert_eq!(summary.debited, 70);

        let text = RewardHistoryTable::to_text(&rows, &catalog);
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("Spa voucher"));

        table.set_search("nothing matches this");
        let empty = table.rows(&list, &catalog);
        assert_eq!(RewardHistoryTable::to_text(&empty, &catalog), "No transactions found");
    }

    #[test]
    fn test_parse_type_filter() {
        assert_eq!("Earn".parse::<TypeFilter>().unwrap(), TypeFilter::Earn);
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert!("expire".parse::<TypeFilter>().is_err());
    }
}
