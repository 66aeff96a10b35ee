//! Timeline assembly: selected insertions + narration segments → plan.
//!
//! Pure aggregation, no decision logic. Clip-insertion segments are emitted
//! immediately after the narration segment they anchor to, with a
//! configured placeholder duration; the engine does not know real clip
//! lengths, so the rendering collaborator reconciles offsets downstream.

use std::collections::BTreeMap;

use crate::params::MatchParams;
use crate::selector::SelectionOutcome;
use crate::similarity::SimilarityMatrix;
use crate::types::{
    Insertion, NarrationSegment, PlanDebug, PlanStatistics, TimelinePlan, TimelineSegment,
};

/// Build the ordered narration/clip segment sequence.
///
/// Emits one `narration` segment per input segment, in input order, and a
/// `clip_insertion` segment starting at `segment.end` right after any
/// segment that has an insertion anchored to it. Narration spans are never
/// altered. Idempotent: the same insertion set always reproduces the same
/// sequence.
pub fn build_timeline_segments(
    segments: &[NarrationSegment],
    insertions: &[Insertion],
    clip_duration_seconds: f64,
) -> Vec<TimelineSegment> {
    let by_segment: BTreeMap<usize, &Insertion> = insertions
        .iter()
        .map(|ins| (ins.segment_index, ins))
        .collect();

    let mut timeline = Vec::with_capacity(segments.len() + insertions.len());
    for seg in segments {
        timeline.push(TimelineSegment::Narration {
            start: seg.start,
            end: seg.end,
            segment_index: seg.index,
            text: seg.text.clone(),
        });
        if let Some(ins) = by_segment.get(&seg.index) {
            timeline.push(TimelineSegment::ClipInsertion {
                start: ins.anchor_time,
                end: ins.anchor_time + clip_duration_seconds,
                clip_id: ins.clip_id.clone(),
                score: ins.score,
                reason: ins.rank_reason.clone(),
            });
        }
    }
    timeline
}

/// Assemble the final plan: segment sequence, statistics, and debug block.
pub fn assemble_timeline(
    segments: &[NarrationSegment],
    outcome: SelectionOutcome,
    matrix: &SimilarityMatrix,
    params: &MatchParams,
) -> TimelinePlan {
    let timeline = build_timeline_segments(
        segments,
        &outcome.insertions,
        params.clip_duration_seconds,
    );

    let insertion_count = outcome.insertions.len();
    let average_score = if insertion_count == 0 {
        0.0
    } else {
        outcome.insertions.iter().map(|i| i.score).sum::<f64>() / insertion_count as f64
    };
    let gap_used = if outcome.relaxation_used {
        params.relaxed_min_gap_seconds
    } else {
        params.primary_min_gap_seconds
    };

    let narration_duration: f64 = segments.iter().map(|s| s.end - s.start).sum();
    let clip_duration = insertion_count as f64 * params.clip_duration_seconds;
    let total_duration = narration_duration + clip_duration;
    let clip_coverage_percent = if total_duration > 0.0 {
        clip_duration / total_duration * 100.0
    } else {
        0.0
    };

    // Present insertions chronologically; acceptance order stays visible
    // in the audit trail.
    let mut insertions = outcome.insertions;
    insertions.sort_by(|a, b| {
        a.anchor_time
            .total_cmp(&b.anchor_time)
            .then(a.clip_id.cmp(&b.clip_id))
    });

    TimelinePlan {
        segments: timeline,
        insertions,
        statistics: PlanStatistics {
            insertion_count,
            average_score,
            threshold_used: params.similarity_threshold,
            gap_used,
            insertion_shortfall: outcome.shortfall,
            narration_duration,
            clip_duration,
            total_duration,
            clip_coverage_percent,
        },
        debug: PlanDebug {
            candidates: outcome.audit,
            relaxation_used: outcome.relaxation_used,
            zero_norm_segments: matrix.zero_norm_segments.clone(),
            zero_norm_clips: matrix.zero_norm_clips.clone(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SelectionPass;

    fn seg(index: usize, start: f64, end: f64) -> NarrationSegment {
        NarrationSegment {
            index,
            start,
            end,
            text: format!("segment {index}"),
            embedding: vec![1.0, 0.0],
        }
    }

    fn insertion(segment_index: usize, anchor_time: f64, clip_id: &str, score: f64) -> Insertion {
        Insertion {
            anchor_time,
            segment_index,
            clip_id: clip_id.to_string(),
            score,
            rank_reason: "test".to_string(),
            pass: SelectionPass::Primary,
        }
    }

    fn empty_matrix() -> SimilarityMatrix {
        SimilarityMatrix {
            entries: Vec::new(),
            zero_norm_segments: Vec::new(),
            zero_norm_clips: Vec::new(),
        }
    }

    fn outcome_with(insertions: Vec<Insertion>) -> SelectionOutcome {
        SelectionOutcome {
            insertions,
            audit: Vec::new(),
            relaxation_used: false,
            shortfall: 0,
        }
    }

    // -- build_timeline_segments ---------------------------------------------

    #[test]
    fn clip_segment_follows_its_narration_segment() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0)];
        let insertions = vec![insertion(0, 10.0, "clip_a", 0.9)];
        let timeline = build_timeline_segments(&segments, &insertions, 4.0);

        assert_eq!(timeline.len(), 3);
        match &timeline[1] {
            TimelineSegment::ClipInsertion {
                start,
                end,
                clip_id,
                ..
            } => {
                assert_eq!(*start, 10.0);
                assert_eq!(*end, 14.0);
                assert_eq!(clip_id, "clip_a");
            }
            other => panic!("expected clip insertion, got {other:?}"),
        }
    }

    #[test]
    fn narration_spans_are_never_altered() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0)];
        let insertions = vec![insertion(0, 10.0, "clip_a", 0.9)];
        let timeline = build_timeline_segments(&segments, &insertions, 4.0);

        match &timeline[2] {
            TimelineSegment::Narration { start, end, .. } => {
                assert_eq!(*start, 10.0);
                assert_eq!(*end, 20.0);
            }
            other => panic!("expected narration, got {other:?}"),
        }
    }

    #[test]
    fn no_insertions_yields_narration_only() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0)];
        let timeline = build_timeline_segments(&segments, &[], 4.0);
        assert_eq!(timeline.len(), 2);
        assert!(timeline
            .iter()
            .all(|t| matches!(t, TimelineSegment::Narration { .. })));
    }

    #[test]
    fn assembler_is_idempotent() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0), seg(2, 20.0, 30.0)];
        let insertions = vec![
            insertion(0, 10.0, "a", 0.9),
            insertion(2, 30.0, "b", 0.8),
        ];
        let first = build_timeline_segments(&segments, &insertions, 4.0);
        let second = build_timeline_segments(&segments, &insertions, 4.0);
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    // -- assemble_timeline ---------------------------------------------------

    #[test]
    fn statistics_aggregate_selected_insertions() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0)];
        let outcome = outcome_with(vec![
            insertion(0, 10.0, "a", 0.8),
            insertion(1, 20.0, "b", 0.9),
        ]);
        let params = MatchParams::default();
        let plan = assemble_timeline(&segments, outcome, &empty_matrix(), &params);

        let stats = &plan.statistics;
        assert_eq!(stats.insertion_count, 2);
        assert!((stats.average_score - 0.85).abs() < 1e-9);
        assert_eq!(stats.threshold_used, params.similarity_threshold);
        assert_eq!(stats.gap_used, params.primary_min_gap_seconds);
        assert_eq!(stats.insertion_shortfall, 0);
        assert!((stats.narration_duration - 20.0).abs() < 1e-9);
        assert!((stats.clip_duration - 8.0).abs() < 1e-9);
        assert!((stats.total_duration - 28.0).abs() < 1e-9);
    }

    #[test]
    fn gap_used_reflects_relaxed_pass() {
        let segments = vec![seg(0, 0.0, 10.0)];
        let outcome = SelectionOutcome {
            insertions: vec![insertion(0, 10.0, "a", 0.8)],
            audit: Vec::new(),
            relaxation_used: true,
            shortfall: 1,
        };
        let params = MatchParams::default();
        let plan = assemble_timeline(&segments, outcome, &empty_matrix(), &params);

        assert_eq!(plan.statistics.gap_used, params.relaxed_min_gap_seconds);
        assert_eq!(plan.statistics.insertion_shortfall, 1);
        assert!(plan.debug.relaxation_used);
    }

    #[test]
    fn empty_outcome_reports_zero_average_score() {
        let segments = vec![seg(0, 0.0, 10.0)];
        let plan = assemble_timeline(
            &segments,
            outcome_with(Vec::new()),
            &empty_matrix(),
            &MatchParams::default(),
        );
        assert_eq!(plan.statistics.insertion_count, 0);
        assert_eq!(plan.statistics.average_score, 0.0);
        assert_eq!(plan.statistics.clip_coverage_percent, 0.0);
    }

    #[test]
    fn plan_insertions_are_chronological() {
        let segments = vec![seg(0, 0.0, 10.0), seg(1, 10.0, 20.0), seg(2, 20.0, 30.0)];
        // Acceptance order: best score first, which is the latest anchor.
        let outcome = outcome_with(vec![
            insertion(2, 30.0, "best", 0.95),
            insertion(0, 10.0, "second", 0.90),
        ]);
        let plan = assemble_timeline(
            &segments,
            outcome,
            &empty_matrix(),
            &MatchParams::default(),
        );

        let anchors: Vec<f64> = plan.insertions.iter().map(|i| i.anchor_time).collect();
        assert_eq!(anchors, vec![10.0, 30.0]);
    }

    #[test]
    fn debug_carries_zero_norm_flags() {
        let segments = vec![seg(0, 0.0, 10.0)];
        let matrix = SimilarityMatrix {
            entries: Vec::new(),
            zero_norm_segments: vec![0],
            zero_norm_clips: vec!["null_clip".to_string()],
        };
        let plan = assemble_timeline(
            &segments,
            outcome_with(Vec::new()),
            &matrix,
            &MatchParams::default(),
        );
        assert_eq!(plan.debug.zero_norm_segments, vec![0]);
        assert_eq!(plan.debug.zero_norm_clips, vec!["null_clip".to_string()]);
    }
}
