pub mod activity;
pub mod node;
pub mod notification;
pub mod subscription;
pub mod token;
pub mod user;

pub use activity::{Entity as Activity, Model as ActivityModel};
pub use node::{Entity as Node, Model as NodeModel};
pub use notification::{Entity as Notification, Model as NotificationModel};
pub use subscription::{Entity as Subscription, Model as SubscriptionModel};
pub use token::{Entity as Token, Model as TokenModel};
pub use user::{Entity as User, Model as UserModel};
