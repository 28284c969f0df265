//! Longest road calculation.
//!
//! A player's road length is the longest vertex-simple path through their own
//! roads. A vertex holding another player's building ends a path: the edge
//! into it counts, but the path cannot continue out the other side.
//!
//! The search is an exhaustive depth-first walk from every vertex of the
//! player's road subgraph, using an explicit stack and a 64-bit visited mask
//! per branch. A player has at most 15 roads, so brute force is cheap.

use crate::board::{Board, PlayerId};
use crate::topology::{VertexId, VERTEX_COUNT};

struct Step {
    vertex: VertexId,
    visited: u64,
    length: u32,
}

/// Length in edges of the player's longest road
pub fn longest_road(board: &Board, player: PlayerId) -> u32 {
    let mut adjacency: Vec<Vec<VertexId>> = vec![Vec::new(); VERTEX_COUNT];
    for road in board.roads_of(player) {
        adjacency[road.edge.a].push(road.edge.b);
        adjacency[road.edge.b].push(road.edge.a);
    }

    let blocked = |v: VertexId| board.vertex(v).owner().is_some_and(|o| o != player);

    let mut best = 0;
    let mut stack = Vec::new();

    for start in 0..VERTEX_COUNT {
        if adjacency[start].is_empty() {
            continue;
        }

        stack.push(Step {
            vertex: start,
            visited: 1 << start,
            length: 0,
        });

        while let Some(step) = stack.pop() {
            best = best.max(step.length);

            // Opponent buildings stop the path, but starting on one is fine
            if step.length > 0 && blocked(step.vertex) {
                continue;
            }

            for &next in &adjacency[step.vertex] {
                if step.visited & (1 << next) != 0 {
                    continue;
                }
                stack.push(Step {
                    vertex: next,
                    visited: step.visited | (1 << next),
                    length: step.length + 1,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Edge;

    fn board_with_path(player: PlayerId, path: &[VertexId]) -> Board {
        let mut board = Board::beginner();
        for pair in path.windows(2) {
            board.place_road(Edge::new(pair[0], pair[1]), player);
        }
        board
    }

    #[test]
    fn test_no_roads() {
        let board = Board::beginner();
        assert_eq!(longest_road(&board, 0), 0);
    }

    #[test]
    fn test_single_road() {
        let board = board_with_path(0, &[4, 8]);
        assert_eq!(longest_road(&board, 0), 1);
    }

    #[test]
    fn test_straight_chain_of_five() {
        let board = board_with_path(0, &[0, 3, 7, 11, 16, 21]);
        assert_eq!(longest_road(&board, 0), 5);
    }

    #[test]
    fn test_opponent_settlement_splits_chain() {
        let mut board = board_with_path(0, &[0, 3, 7, 11, 16, 21]);
        board.place_settlement(11, 1);
        // 0-3-7-11 is three long, 11-16-21 is two
        assert_eq!(longest_road(&board, 0), 3);
    }

    #[test]
    fn test_own_settlement_does_not_block() {
        let mut board = board_with_path(0, &[0, 3, 7, 11, 16, 21]);
        board.place_settlement(11, 0);
        assert_eq!(longest_road(&board, 0), 5);
    }

    #[test]
    fn test_opponent_settlement_at_end_does_not_shorten() {
        let mut board = board_with_path(0, &[0, 3, 7, 11, 16, 21]);
        board.place_settlement(21, 1);
        assert_eq!(longest_road(&board, 0), 5);
    }

    #[test]
    fn test_loop_does_not_inflate() {
        // The six edges around tile 0
        let board = board_with_path(0, &[0, 4, 8, 12, 7, 3, 0]);
        assert_eq!(longest_road(&board, 0), 5);
    }

    #[test]
    fn test_branch_takes_longest_arm() {
        // Trunk 0-3-7-11 with a spur 7-12-17
        let mut board = board_with_path(0, &[0, 3, 7, 11]);
        board.place_road(Edge::new(7, 12), 0);
        board.place_road(Edge::new(12, 17), 0);
        // 0-3-7-12-17 is four
        assert_eq!(longest_road(&board, 0), 4);
    }

    #[test]
    fn test_other_players_roads_ignored() {
        let mut board = board_with_path(0, &[0, 3, 7]);
        board.place_road(Edge::new(7, 11), 1);
        board.place_road(Edge::new(11, 16), 1);
        assert_eq!(longest_road(&board, 0), 2);
        assert_eq!(longest_road(&board, 1), 2);
    }

    #[test]
    fn test_dense_network_terminates() {
        // Every edge around the top three tiles for one player
        let mut board = Board::beginner();
        for tile in 0..3 {
            let ring = crate::topology::tile_vertices(tile);
            for i in 0..6 {
                let edge = Edge::new(ring[i], ring[(i + 1) % 6]);
                if board.road_at(edge.a, edge.b).is_none() {
                    board.place_road(edge, 0);
                }
            }
        }
        assert_eq!(board.roads_of(0).count(), 16);
        // 14 vertices, and a path can visit all of them
        assert_eq!(longest_road(&board, 0), 13);
    }
}
