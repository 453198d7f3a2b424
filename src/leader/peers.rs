use crate::commitlog::Sequence;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tokio::time::Instant;

/// PeerId is the broker's self-chosen, cluster-unique name.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        PeerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// PeerEndpoint is an opaque handle for calling back into a broker. The registry never looks
/// inside; the transport validates it when it connects.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PeerEndpoint(String);

impl PeerEndpoint {
    pub fn new(endpoint: impl Into<String>) -> Self {
        PeerEndpoint(endpoint.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PeerRole {
    Voter,
    Observer,
}

impl PeerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeerRole::Voter => "voter",
            PeerRole::Observer => "observer",
        }
    }
}

impl FromStr for PeerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "voter" => Ok(PeerRole::Voter),
            "observer" => Ok(PeerRole::Observer),
            other => Err(format!("Unknown peer role '{}'. Expected 'voter' or 'observer'.", other)),
        }
    }
}

/// Peer is the leader's view of one registered broker.
#[derive(Clone, Debug)]
pub struct Peer {
    id: PeerId,
    endpoint: PeerEndpoint,
    role: PeerRole,
    // Next sequence this peer has not yet received.
    cursor: Sequence,
    last_heartbeat: Instant,
}

impl Peer {
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn endpoint(&self) -> &PeerEndpoint {
        &self.endpoint
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    pub fn cursor(&self) -> Sequence {
        self.cursor
    }

    pub fn last_heartbeat(&self) -> Instant {
        self.last_heartbeat
    }

    pub(crate) fn is_voter(&self) -> bool {
        self.role == PeerRole::Voter
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Peer {0:?} is not registered")]
pub(crate) struct UnknownPeer(pub(crate) PeerId);

/// PeerRegistry tracks every registered broker. Peers are ordered by id, which is what makes
/// promotion candidate selection deterministic.
pub(crate) struct PeerRegistry {
    peers: BTreeMap<PeerId, Peer>,
}

impl PeerRegistry {
    pub(crate) fn new() -> Self {
        PeerRegistry { peers: BTreeMap::new() }
    }

    /// Registers or re-registers a peer. A peer that re-registers is assumed to have lost its
    /// state, so its cursor starts over. Returns the previous registration, if any.
    pub(crate) fn register(&mut self, id: PeerId, endpoint: PeerEndpoint, role: PeerRole, now: Instant) -> Option<Peer> {
        let peer = Peer {
            id: id.clone(),
            endpoint,
            role,
            cursor: Sequence::start(),
            last_heartbeat: now,
        };

        self.peers.insert(id, peer)
    }

    pub(crate) fn lookup(&self, id: &PeerId) -> Result<&Peer, UnknownPeer> {
        self.peers.get(id).ok_or_else(|| UnknownPeer(id.clone()))
    }

    pub(crate) fn update_cursor(&mut self, id: &PeerId, new_cursor: Sequence) -> Result<(), UnknownPeer> {
        self.lookup_mut(id)?.cursor = new_cursor;
        Ok(())
    }

    pub(crate) fn touch_heartbeat(&mut self, id: &PeerId, now: Instant) -> Result<(), UnknownPeer> {
        self.lookup_mut(id)?.last_heartbeat = now;
        Ok(())
    }

    /// Only the membership policy changes roles after registration.
    pub(super) fn set_role(&mut self, id: &PeerId, role: PeerRole) -> Result<(), UnknownPeer> {
        self.lookup_mut(id)?.role = role;
        Ok(())
    }

    pub(crate) fn remove(&mut self, id: &PeerId) -> Option<Peer> {
        self.peers.remove(id)
    }

    /// Point-in-time copy, so callers don't hold the registry across network calls.
    pub(crate) fn voters_snapshot(&self) -> Vec<Peer> {
        self.snapshot_of_role(PeerRole::Voter)
    }

    pub(crate) fn observers_snapshot(&self) -> Vec<Peer> {
        self.snapshot_of_role(PeerRole::Observer)
    }

    pub(crate) fn snapshot(&self) -> Vec<Peer> {
        self.peers.values().cloned().collect()
    }

    pub(crate) fn num_voters(&self) -> usize {
        self.peers.values().filter(|p| p.is_voter()).count()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    fn snapshot_of_role(&self, role: PeerRole) -> Vec<Peer> {
        self.peers.values().filter(|p| p.role == role).cloned().collect()
    }

    fn lookup_mut(&mut self, id: &PeerId) -> Result<&mut Peer, UnknownPeer> {
        self.peers.get_mut(id).ok_or_else(|| UnknownPeer(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    fn endpoint(port: u16) -> PeerEndpoint {
        PeerEndpoint::new(format!("http://127.0.0.1:{}", port))
    }

    #[test]
    fn re_register_resets_cursor_and_overwrites_role() {
        let now = Instant::now();
        let mut registry = PeerRegistry::new();
        let id = PeerId::new("broker-1");

        assert!(registry.register(id.clone(), endpoint(1), PeerRole::Voter, now).is_none());
        registry.update_cursor(&id, Sequence::new(7)).unwrap();

        let previous = registry
            .register(id.clone(), endpoint(2), PeerRole::Observer, now)
            .expect("Expected previous registration");
        assert_eq!(previous.cursor(), Sequence::new(7));

        let peer = registry.lookup(&id).unwrap();
        assert_eq!(peer.cursor(), Sequence::start());
        assert_eq!(peer.role(), PeerRole::Observer);
        assert_eq!(peer.endpoint(), &endpoint(2));
    }

    #[test]
    fn unknown_peer_operations_fail() {
        let mut registry = PeerRegistry::new();
        let ghost = PeerId::new("ghost");

        assert_eq!(registry.lookup(&ghost).err(), Some(UnknownPeer(ghost.clone())));
        assert_eq!(
            registry.update_cursor(&ghost, Sequence::new(1)),
            Err(UnknownPeer(ghost.clone()))
        );
        assert_eq!(
            registry.touch_heartbeat(&ghost, Instant::now()),
            Err(UnknownPeer(ghost.clone()))
        );
        assert_eq!(registry.set_role(&ghost, PeerRole::Voter), Err(UnknownPeer(ghost.clone())));
        assert!(registry.remove(&ghost).is_none());
    }

    #[test]
    fn snapshots_split_by_role() {
        let now = Instant::now();
        let mut registry = PeerRegistry::new();
        registry.register(PeerId::new("b"), endpoint(2), PeerRole::Voter, now);
        registry.register(PeerId::new("a"), endpoint(1), PeerRole::Observer, now);
        registry.register(PeerId::new("c"), endpoint(3), PeerRole::Voter, now);

        let voters: Vec<_> = registry.voters_snapshot().into_iter().map(|p| p.id().clone()).collect();
        let observers: Vec<_> = registry.observers_snapshot().into_iter().map(|p| p.id().clone()).collect();

        assert_eq!(voters, vec![PeerId::new("b"), PeerId::new("c")]);
        assert_eq!(observers, vec![PeerId::new("a")]);
        assert_eq!(registry.num_voters(), 2);

        // Snapshot is a copy.
        let snapshot = registry.voters_snapshot();
        let later = now + Duration::from_secs(3);
        registry.touch_heartbeat(&PeerId::new("b"), later).unwrap();
        assert_eq!(snapshot[0].last_heartbeat(), now);
        assert_eq!(registry.voters_snapshot()[0].last_heartbeat(), later);
    }
}
