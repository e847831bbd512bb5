//! Yoga Catalog
//!
//! 자세 8개와 루틴 3개로 이루어진 정적 카탈로그. DB에 저장하지 않는다.

use serde::{Deserialize, Serialize};

/// 요가 자세
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YogaPose {
    pub id: u32,
    pub name: &'static str,
    pub sanskrit: &'static str,
    pub category: &'static str,
    pub difficulty: &'static str,
    /// 기본 유지 시간 (초)
    pub duration: u32,
    pub benefits: &'static [&'static str],
    pub instructions: &'static [&'static str],
    pub image: &'static str,
    pub video: &'static str,
}

/// 루틴 안의 한 단계
#[derive(Debug, Clone, Serialize)]
pub struct RoutineStep {
    pub pose: &'static YogaPose,
    /// 초
    pub duration: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Routine {
    pub id: u32,
    pub name: &'static str,
    /// 분
    pub duration: u32,
    pub difficulty: &'static str,
    pub description: &'static str,
    pub poses: &'static [RoutineStep],
}

/// `GET /yoga/poses` 필터
#[derive(Debug, Default, Deserialize)]
pub struct PoseFilter {
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub limit: Option<usize>,
}

// ============ Catalog ============

const MOUNTAIN: YogaPose = YogaPose {
    id: 1,
    name: "Mountain Pose (Tadasana)",
    sanskrit: "Tadasana",
    category: "standing",
    difficulty: "beginner",
    duration: 30,
    benefits: &["Improves posture", "Strengthens thighs and core", "Increases awareness"],
    instructions: &[
        "Stand with feet together, arms at sides",
        "Lift and spread toes, then place them back down",
        "Engage thigh muscles and lift kneecaps",
        "Draw in lower belly and lift chest",
        "Relax shoulders and extend arms down",
        "Hold for 30 seconds to 1 minute",
    ],
    image: "https://example.com/mountain-pose.jpg",
    video: "https://example.com/mountain-pose-video.mp4",
};

const DOWNWARD_DOG: YogaPose = YogaPose {
    id: 2,
    name: "Downward-Facing Dog (Adho Mukha Svanasana)",
    sanskrit: "Adho Mukha Svanasana",
    category: "inversion",
    difficulty: "beginner",
    duration: 60,
    benefits: &["Strengthens arms and legs", "Stretches shoulders and hamstrings", "Calms the mind"],
    instructions: &[
        "Start on hands and knees",
        "Lift hips up and back",
        "Press hands into mat and lift hips",
        "Straighten legs as much as possible",
        "Keep head between arms",
        "Hold for 1-3 minutes",
    ],
    image: "https://example.com/downward-dog.jpg",
    video: "https://example.com/downward-dog-video.mp4",
};

const WARRIOR_ONE: YogaPose = YogaPose {
    id: 3,
    name: "Warrior I (Virabhadrasana I)",
    sanskrit: "Virabhadrasana I",
    category: "standing",
    difficulty: "intermediate",
    duration: 45,
    benefits: &["Strengthens legs and core", "Opens chest and shoulders", "Improves balance"],
    instructions: &[
        "Step one foot back into a lunge",
        "Turn back foot out 45 degrees",
        "Bend front knee to 90 degrees",
        "Lift arms overhead",
        "Square hips to front",
        "Hold for 30-60 seconds each side",
    ],
    image: "https://example.com/warrior-1.jpg",
    video: "https://example.com/warrior-1-video.mp4",
};

const TREE: YogaPose = YogaPose {
    id: 4,
    name: "Tree Pose (Vrksasana)",
    sanskrit: "Vrksasana",
    category: "balancing",
    difficulty: "beginner",
    duration: 30,
    benefits: &["Improves balance", "Strengthens legs", "Focuses the mind"],
    instructions: &[
        "Stand on one leg",
        "Place other foot on inner thigh or calf",
        "Bring hands to prayer position",
        "Focus on a point ahead",
        "Keep standing leg strong",
        "Hold for 30-60 seconds each side",
    ],
    image: "https://example.com/tree-pose.jpg",
    video: "https://example.com/tree-pose-video.mp4",
};

const CHILDS: YogaPose = YogaPose {
    id: 5,
    name: "Child's Pose (Balasana)",
    sanskrit: "Balasana",
    category: "restorative",
    difficulty: "beginner",
    duration: 120,
    benefits: &["Relieves back pain", "Calms the mind", "Stretches hips and thighs"],
    instructions: &[
        "Kneel on mat with big toes touching",
        "Sit back on heels",
        "Fold forward, extending arms",
        "Rest forehead on mat",
        "Relax and breathe deeply",
        "Hold for 1-3 minutes",
    ],
    image: "https://example.com/childs-pose.jpg",
    video: "https://example.com/childs-pose-video.mp4",
};

const COBRA: YogaPose = YogaPose {
    id: 6,
    name: "Cobra Pose (Bhujangasana)",
    sanskrit: "Bhujangasana",
    category: "backbend",
    difficulty: "beginner",
    duration: 30,
    benefits: &["Strengthens back muscles", "Opens chest", "Improves posture"],
    instructions: &[
        "Lie face down on mat",
        "Place hands under shoulders",
        "Press into hands and lift chest",
        "Keep pelvis on mat",
        "Look forward or slightly up",
        "Hold for 15-30 seconds",
    ],
    image: "https://example.com/cobra-pose.jpg",
    video: "https://example.com/cobra-pose-video.mp4",
};

const BRIDGE: YogaPose = YogaPose {
    id: 7,
    name: "Bridge Pose (Setu Bandhasana)",
    sanskrit: "Setu Bandhasana",
    category: "backbend",
    difficulty: "beginner",
    duration: 45,
    benefits: &["Strengthens back and glutes", "Opens chest", "Calms the mind"],
    instructions: &[
        "Lie on back with knees bent",
        "Place feet hip-width apart",
        "Press into feet and lift hips",
        "Interlace hands under back",
        "Roll shoulders under",
        "Hold for 30-60 seconds",
    ],
    image: "https://example.com/bridge-pose.jpg",
    video: "https://example.com/bridge-pose-video.mp4",
};

const SEATED_FORWARD_BEND: YogaPose = YogaPose {
    id: 8,
    name: "Seated Forward Bend (Paschimottanasana)",
    sanskrit: "Paschimottanasana",
    category: "forward-bend",
    difficulty: "intermediate",
    duration: 60,
    benefits: &["Stretches hamstrings", "Calms the mind", "Relieves stress"],
    instructions: &[
        "Sit with legs extended",
        "Fold forward from hips",
        "Reach for feet or ankles",
        "Keep back straight",
        "Breathe deeply",
        "Hold for 1-3 minutes",
    ],
    image: "https://example.com/seated-forward-bend.jpg",
    video: "https://example.com/seated-forward-bend-video.mp4",
};

static POSES: [YogaPose; 8] = [
    MOUNTAIN,
    DOWNWARD_DOG,
    WARRIOR_ONE,
    TREE,
    CHILDS,
    COBRA,
    BRIDGE,
    SEATED_FORWARD_BEND,
];

static ROUTINES: [Routine; 3] = [
    Routine {
        id: 1,
        name: "Morning Flow",
        duration: 15,
        difficulty: "beginner",
        description: "A gentle morning routine to wake up your body and mind",
        poses: &[
            RoutineStep { pose: &MOUNTAIN, duration: 30 },
            RoutineStep { pose: &DOWNWARD_DOG, duration: 60 },
            RoutineStep { pose: &CHILDS, duration: 120 },
            RoutineStep { pose: &COBRA, duration: 30 },
            RoutineStep { pose: &CHILDS, duration: 60 },
        ],
    },
    Routine {
        id: 2,
        name: "Strength Builder",
        duration: 30,
        difficulty: "intermediate",
        description: "Build strength and improve balance",
        poses: &[
            RoutineStep { pose: &MOUNTAIN, duration: 30 },
            RoutineStep { pose: &WARRIOR_ONE, duration: 45 },
            RoutineStep { pose: &TREE, duration: 30 },
            RoutineStep { pose: &BRIDGE, duration: 45 },
            RoutineStep { pose: &DOWNWARD_DOG, duration: 60 },
            RoutineStep { pose: &CHILDS, duration: 60 },
        ],
    },
    Routine {
        id: 3,
        name: "Relaxation Sequence",
        duration: 20,
        difficulty: "beginner",
        description: "A calming sequence to reduce stress and tension",
        poses: &[
            RoutineStep { pose: &CHILDS, duration: 120 },
            RoutineStep { pose: &BRIDGE, duration: 45 },
            RoutineStep { pose: &SEATED_FORWARD_BEND, duration: 120 },
            RoutineStep { pose: &CHILDS, duration: 120 },
        ],
    },
];

// ============ Queries ============

/// category / difficulty 일치, limit 개까지
pub fn poses(filter: &PoseFilter) -> Vec<&'static YogaPose> {
    POSES
        .iter()
        .filter(|p| filter.category.as_deref().map_or(true, |c| p.category == c))
        .filter(|p| filter.difficulty.as_deref().map_or(true, |d| p.difficulty == d))
        .take(filter.limit.unwrap_or(usize::MAX))
        .collect()
}

pub fn find_pose(id: u32) -> Option<&'static YogaPose> {
    POSES.iter().find(|p| p.id == id)
}

pub fn routines() -> &'static [Routine] {
    &ROUTINES
}

pub fn find_routine(id: u32) -> Option<&'static Routine> {
    ROUTINES.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size() {
        assert_eq!(poses(&PoseFilter::default()).len(), 8);
        assert_eq!(routines().len(), 3);
    }

    #[test]
    fn test_filter_by_category_and_difficulty() {
        let filter = PoseFilter {
            category: Some("standing".to_string()),
            ..Default::default()
        };
        let standing = poses(&filter);
        assert_eq!(standing.len(), 2);

        let filter = PoseFilter {
            category: Some("standing".to_string()),
            difficulty: Some("beginner".to_string()),
            limit: None,
        };
        let names: Vec<_> = poses(&filter).iter().map(|p| p.sanskrit).collect();
        assert_eq!(names, vec!["Tadasana"]);
    }

    #[test]
    fn test_limit_keeps_catalog_order() {
        let filter = PoseFilter {
            limit: Some(3),
            ..Default::default()
        };
        let ids: Vec<_> = poses(&filter).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(find_pose(5).map(|p| p.sanskrit), Some("Balasana"));
        assert!(find_pose(99).is_none());

        let relax = find_routine(3).unwrap();
        assert_eq!(relax.poses.len(), 4);
        assert_eq!(relax.poses[2].pose.id, 8);
        assert!(find_routine(0).is_none());
    }
}
