/// Stack assembly: the ordered members under one root node
use nalgebra::Point3;

use crate::material::Rgb;
use crate::parts::{BuildContext, PartSpec};
use crate::transform::Node;
use crate::transition::MacroState;
use crate::visual::{ResourceCount, Visual};

/// One part bound to a live node under the assembly root
#[derive(Debug, Clone)]
pub struct StackMember {
    pub name: String,
    pub rest_offset: f32,
    pub spread_offset: f32,
    pub spin_rate: f32,
    pub accent: Rgb,
    pub visual: Visual,
    pub node: Node,
}

impl StackMember {
    /// Resting offset for a macro state
    pub fn offset_for(&self, state: MacroState) -> f32 {
        match state {
            MacroState::Assembled => self.rest_offset,
            MacroState::Exploded => self.spread_offset,
        }
    }

    pub fn offset(&self) -> f32 {
        self.node.position.y
    }
}

/// Read-only view of a member for side UI
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub name: String,
    pub accent: Rgb,
    pub offset: f32,
    pub pieces: usize,
    pub triangles: usize,
    /// Local-space extent of the visual, `None` for an empty one
    pub bounds: Option<(Point3<f32>, Point3<f32>)>,
}

impl From<&StackMember> for MemberInfo {
    fn from(member: &StackMember) -> Self {
        Self {
            name: member.name.clone(),
            accent: member.accent,
            offset: member.offset(),
            pieces: member.visual.pieces.len(),
            triangles: member.visual.triangle_count(),
            bounds: member.visual.bounds(),
        }
    }
}

/// The stack: a root node plus members in part order
#[derive(Debug, Clone)]
pub struct StackAssembly {
    pub root: Node,
    members: Vec<StackMember>,
}

impl StackAssembly {
    /// Build every member from `specs`, placing each at its resting offset
    /// for `initial`.
    pub fn build<P: PartSpec>(specs: &[P], initial: MacroState, ctx: &BuildContext) -> Self {
        let members = specs
            .iter()
            .map(|spec| {
                let mut member = StackMember {
                    name: spec.name().to_string(),
                    rest_offset: spec.rest_offset(),
                    spread_offset: spec.spread_offset(),
                    spin_rate: spec.spin_rate(),
                    accent: spec.accent(),
                    visual: spec.build_visual(ctx),
                    node: Node::new(),
                };
                member.node = Node::at_height(member.offset_for(initial));
                member
            })
            .collect::<Vec<_>>();

        log::debug!("assembled {} members ({:?})", members.len(), initial);
        Self {
            root: Node::new(),
            members,
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[StackMember] {
        &self.members
    }

    pub fn members_mut(&mut self) -> &mut [StackMember] {
        &mut self.members
    }

    pub fn member(&self, name: &str) -> Option<&StackMember> {
        self.members.iter().find(|m| m.name == name)
    }

    /// Snap every member to its resting offset for `state` with identity
    /// rotation and scale.
    pub fn snap_to(&mut self, state: MacroState) {
        for member in &mut self.members {
            member.node = Node::at_height(member.offset_for(state));
        }
    }

    pub fn snapshot(&self) -> Vec<MemberInfo> {
        self.members.iter().map(MemberInfo::from).collect()
    }

    /// Generated graphics resources still held by the members
    pub fn resources(&self) -> ResourceCount {
        self.members
            .iter()
            .map(|m| m.visual.resources())
            .fold(ResourceCount::default(), |acc, r| acc + r)
    }

    /// Drop every member and its generated resources
    pub fn clear(&mut self) {
        self.members.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::Ingredient;

    fn burger(initial: MacroState) -> StackAssembly {
        StackAssembly::build(&Ingredient::STACK, initial, &BuildContext::default())
    }

    #[test]
    fn test_order_preserved() {
        let stack = burger(MacroState::Exploded);
        let names: Vec<_> = stack.members().iter().map(|m| m.name.as_str()).collect();
        let expected: Vec<_> = Ingredient::STACK.iter().map(|p| p.name()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_initial_offsets() {
        let exploded = burger(MacroState::Exploded);
        for m in exploded.members() {
            assert_eq!(m.offset(), m.spread_offset);
            assert!(m.node.is_settled());
            assert_eq!(m.node.rotation.y, 0.0);
        }
        let assembled = burger(MacroState::Assembled);
        for m in assembled.members() {
            assert_eq!(m.offset(), m.rest_offset);
        }
        assert_eq!(assembled.root, Node::new());
    }

    #[test]
    fn test_lookup_by_name() {
        let stack = burger(MacroState::Exploded);
        let patty = stack.member("Beef Patty").unwrap();
        assert_eq!(patty.rest_offset, -0.15);
        assert!(stack.member("Bacon").is_none());
    }

    #[test]
    fn test_snapshot_describes_members() {
        let stack = burger(MacroState::Exploded);
        let info = stack.snapshot();
        let top = &info[0];
        assert_eq!(top.name, "Top Bun");
        assert_eq!(top.offset, 3.2);
        assert_eq!(top.pieces, stack.members()[0].visual.pieces.len());
        assert!(top.pieces > 1);
        let (min, max) = top.bounds.unwrap();
        assert!(max.x > min.x && max.y > min.y);
        assert_eq!(info[6], MemberInfo::from(stack.member("Beef Patty").unwrap()));
    }

    #[test]
    fn test_snap_clears_transients() {
        let mut stack = burger(MacroState::Exploded);
        for m in stack.members_mut() {
            m.node.rotation.x = 0.03;
            m.node.rotation.y = 2.0;
            m.node.scale = 1.1;
        }
        stack.snap_to(MacroState::Assembled);
        for m in stack.members() {
            assert_eq!(m.offset(), m.rest_offset);
            assert!(m.node.is_settled());
            assert_eq!(m.node.rotation.y, 0.0);
        }
    }

    #[test]
    fn test_clear_releases_resources() {
        let mut stack = burger(MacroState::Exploded);
        assert!(stack.resources().total() > 0);
        assert_eq!(stack.snapshot().len(), 9);
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.resources().total(), 0);
    }
}
