//! Tests for batch grouping and bookkeeping

use super::*;
use crate::tokenizer::{Statement, tokenize};
use rstest::rstest;

fn statements(count: usize) -> Vec<Statement> {
    (0..count)
        .map(|index| Statement {
            index,
            text: format!("INSERT INTO t VALUES ({});", index),
        })
        .collect()
}

mod batch_options_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_batch_options_default() {
        let options = BatchOptions::default();

        assert_eq!(options.batch_size, 50);
        assert_eq!(options.error_threshold, 20);
        assert_eq!(options.progress_interval, 500);
    }

    #[test]
    fn test_batch_options_builder() {
        let options = BatchOptions::new()
            .with_batch_size(10)
            .with_error_threshold(0)
            .with_progress_interval(100);

        assert_eq!(options.batch_size, 10);
        assert_eq!(options.error_threshold, 0);
        assert_eq!(options.progress_interval, 100);
    }

    #[test]
    fn test_batch_options_minimums() {
        let options = BatchOptions::new()
            .with_batch_size(0)
            .with_progress_interval(0);

        // Should be clamped to at least 1
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.progress_interval, 1);
    }
}

mod grouping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest]
    #[case(123, 50, vec![50, 50, 23])]
    #[case(100, 50, vec![50, 50])]
    #[case(3, 50, vec![3])]
    #[case(5, 2, vec![2, 2, 1])]
    #[case(0, 50, vec![])]
    fn test_batch_sizes(
        #[case] count: usize,
        #[case] capacity: usize,
        #[case] expected: Vec<usize>,
    ) {
        let statements = statements(count);

        let sizes: Vec<usize> = group_into_batches(&statements, capacity)
            .iter()
            .map(Batch::len)
            .collect();

        assert_eq!(sizes, expected);
    }

    #[test]
    fn test_order_and_indices_preserved() {
        let statements = statements(123);

        let batches = group_into_batches(&statements, 50);

        assert_eq!(
            batches.iter().map(|b| b.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            batches.iter().map(|b| b.offset).collect::<Vec<_>>(),
            vec![0, 50, 100]
        );
        let flattened: Vec<usize> = batches
            .iter()
            .flat_map(|b| b.statements.iter().map(|s| s.index))
            .collect();
        assert_eq!(flattened, (0..123).collect::<Vec<_>>());
        assert_eq!(batches[2].end(), 123);
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        let statements = statements(3);

        assert_eq!(group_into_batches(&statements, 0).len(), 3);
    }
}

mod batch_sql_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sql_joins_statements_with_newlines() {
        let statements = tokenize("CREATE TABLE a (id int); INSERT INTO a VALUES ('x;y');");
        let batches = group_into_batches(&statements, 50);

        assert_eq!(
            batches[0].sql(),
            "CREATE TABLE a (id int);\nINSERT INTO a VALUES ('x;y');"
        );
    }

    #[test]
    fn test_sql_does_not_double_terminators() {
        let statements = statements(2);
        let batches = group_into_batches(&statements, 2);

        assert!(!batches[0].sql().contains(";;"));
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_message_truncated_to_150_chars() {
        let long = "é".repeat(400);

        let failure = BatchFailure::new(3, FailureKind::Execution, &long);

        assert_eq!(failure.message.chars().count(), 150);
        assert_eq!(failure.batch_index, 3);
        assert!(!failure.is_benign());
    }

    #[test]
    fn test_short_message_kept() {
        let failure = BatchFailure::new(
            1,
            FailureKind::BenignConflict,
            "relation \"users\" already exists",
        );

        assert_eq!(failure.message, "relation \"users\" already exists");
        assert!(failure.is_benign());
    }
}

mod result_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_by_status() {
        let result = BatchExecutionResult {
            statuses: vec![
                BatchStatus::Succeeded,
                BatchStatus::Failed(FailureKind::BenignConflict),
                BatchStatus::Failed(FailureKind::Execution),
                BatchStatus::Skipped,
                BatchStatus::Skipped,
            ],
            failures: vec![
                BatchFailure::new(2, FailureKind::BenignConflict, "already exists"),
                BatchFailure::new(3, FailureKind::Execution, "syntax error"),
            ],
            total_statements: 250,
            aborted_at: Some(3),
            ..Default::default()
        };

        assert_eq!(result.batch_count(), 5);
        assert_eq!(result.attempted_count(), 3);
        assert_eq!(result.success_count(), 1);
        assert_eq!(result.benign_count(), 1);
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.skipped_count(), 2);
        assert!(result.is_aborted());
        assert_eq!(
            result.error_failures().map(|f| f.batch_index).collect::<Vec<_>>(),
            vec![3]
        );
    }
}
