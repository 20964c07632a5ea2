//! Derived room view.
//!
//! Pure projection of the latest room and participant snapshots for one viewer:
//! presence corrected by staleness, per-viewer vote visibility, and the tally.

use yoriai_server::domain::{
    Participant, ParticipantId, PresencePolicy, Room, Tally, Timestamp, VoteVisibility,
    visible_vote,
};

/// 1 人の参加者の表示用の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub is_me: bool,
    pub is_host: bool,
    /// 実効在室（`online` かつ閾値内に生存通知あり）
    pub online: bool,
    pub vote: VoteVisibility,
}

/// Room 全体の表示用の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomView {
    pub room: Room,
    pub participants: Vec<ParticipantView>,
    pub tally: Tally,
    /// 閲覧者がホストとして操作できるか
    pub is_host: bool,
    pub online_count: usize,
    pub voted_count: usize,
}

impl RoomView {
    pub fn me(&self) -> Option<&ParticipantView> {
        self.participants.iter().find(|p| p.is_me)
    }
}

pub fn derive_view(
    room: &Room,
    participants: &[Participant],
    viewer: &ParticipantId,
    viewer_is_host: bool,
    now: Timestamp,
    policy: &PresencePolicy,
) -> RoomView {
    let views: Vec<ParticipantView> = participants
        .iter()
        .map(|p| ParticipantView {
            id: p.id.clone(),
            name: p.name.as_str().to_string(),
            is_me: &p.id == viewer,
            is_host: room.is_hosted_by(&p.id),
            online: policy.is_effectively_online(p, now),
            vote: visible_vote(p, viewer, room.status),
        })
        .collect();

    RoomView {
        room: room.clone(),
        online_count: views.iter().filter(|p| p.online).count(),
        voted_count: participants.iter().filter(|p| p.has_voted()).count(),
        tally: Tally::compute(participants),
        is_host: viewer_is_host,
        participants: views,
    }
}
