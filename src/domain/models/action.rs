use super::InjectMessage;

pub enum Action {
    Continue(),
    Inbound(InjectMessage),
    Quit(),
}
